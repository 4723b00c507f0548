use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::{fs, io};

use chrono::{Datelike, NaiveDate, Utc};
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use ramhorns::Template;
use serde::Deserialize;
use spdlog::info;

use crate::auth::{Authenticate, NoAdminAuth};
use crate::config::Config;
use crate::filter;
use crate::filter::filter_posts;
use crate::metrics::{MetricHandler, MetricSender, MetricWriter};
use crate::paginator::Paginator;
use crate::post::Post;
use crate::post_render::{render_page, render_post_html};
use crate::post_store::PostStore;
use crate::query_string::QueryString;
use crate::scheduler::{BookingBackend, Booking, ContactDetails, LoggedBooking, MeetingLength, Wizard};
use crate::text_utils::parse_post_date;
use crate::view::list_renderer::{ListInput, ListRenderer};
use crate::view::page_renderer::PageRenderer;
use crate::view::post_renderer::PostRenderer;
use crate::view::rss_renderer::RssChannel;
use crate::view::schedule_renderer::{ConfirmationRenderer, ScheduleRenderer};

const DEFAULT_INDEX_BASE: &str = "index";
const DEFAULT_RELATED_LIMIT: u32 = 3;

struct AppState {
    store: PostStore,
    auth: Box<dyn Authenticate + Send>,
    config: Config,
}

#[derive(ramhorns::Content)]
struct IndexPage<'a> {
    site_name: &'a str,
    tagline: &'a str,
    years_building: i64,
    post_count: i64,
    days_online: i64,
}

#[derive(Deserialize)]
struct ScheduleForm {
    duration: String,
    date: String,
    time: String,
    name: String,
    email: String,
    company: Option<String>,
    agenda: Option<String>,
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

fn request_origin(req: &HttpRequest) -> String {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("direct")
        .to_string()
}

fn read_template(tpl_dir: &PathBuf, file_name: &str) -> io::Result<String> {
    let full_path = tpl_dir.join(file_name);
    fs::read_to_string(full_path)
}

// Begin: Redirect region --------
#[web::get("/view/{post}")]
async fn view_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", path.into_inner() + "/")
        .content_type("text/html; charset=utf-8")
        .finish()
}

#[web::get("/page/{page}")]
async fn page_wo_slash(path: web::types::Path<String>) -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", path.into_inner() + "/")
        .content_type("text/html; charset=utf-8")
        .finish()
}
// End: Redirect region --------

fn render_index(config: &Config, post_count: usize) -> io::Result<String> {
    let index_tpl_src = read_template(&config.paths.template_dir, "index.tpl")?;
    let index_tpl = match Template::new(index_tpl_src) {
        Ok(x) => x,
        Err(e) => {
            return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing index template: {}", e)));
        }
    };

    let today = Utc::now().date_naive();
    let years_building = (today.year() - config.site.founded_year) as i64;
    let days_online = (today - config.site.launched.0).num_days();

    Ok(index_tpl.render(&IndexPage {
        site_name: config.site.name.as_str(),
        tagline: config.site.tagline.as_str(),
        years_building,
        post_count: post_count as i64,
        days_online,
    }))
}

#[web::get("/")]
async fn index(req: HttpRequest, state: web::types::State<Arc<Mutex<AppState>>>,
               metrics: web::types::State<MetricSender>) -> web::HttpResponse {
    let rendered = {
        let state = state.lock().unwrap();
        render_index(&state.config, state.store.len())
    };

    let response = match rendered {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => return web::HttpResponse::InternalServerError()
            .body(format!("Error rendering index: {}", e)),
    };

    metrics.index(request_origin(&req)).await;
    response
}

fn render_blog(config: &Config, store: &PostStore, qs: &QueryString) -> io::Result<(String, bool)> {
    let criteria = qs.criteria();
    let posts = store.posts();

    let filtered = filter_posts(posts, &criteria);
    let featured = filter::featured(posts);

    // The highlighted article has its own card; keep it out of the grid
    let grid: Vec<&Post> = filtered.into_iter()
        .filter(|post| featured.map(|f| f.id != post.id).unwrap_or(true))
        .collect();

    let paginator = Paginator::from(&grid, config.defaults.page_size);
    let cur_page = match qs.get_page() { // Sanity check for current page
        x if x > paginator.page_count() => 1,
        x => x,
    };

    let page_posts: &[&Post] = if paginator.page_count() == 0 {
        &[]
    } else {
        paginator.page(cur_page)
            .map_err(|e| io::Error::new(ErrorKind::InvalidInput, e))?
    };

    let categories = filter::category_facets(posts);
    let authors = filter::author_facets(posts);
    let tags = filter::tag_facets(posts);

    let template_src = read_template(&config.paths.template_dir, "postlist.tpl")?;
    let renderer = ListRenderer::new(&template_src)?;

    let rendered = renderer.render(&ListInput {
        criteria: &criteria,
        featured,
        posts: page_posts,
        total_count: posts.len(),
        categories: &categories,
        authors: &authors,
        tags: &tags,
        cur_page,
        page_count: paginator.page_count(),
    });

    Ok((rendered, criteria.has_active_filters()))
}

#[web::get("/blog")]
async fn blog(req: HttpRequest, state: web::types::State<Arc<Mutex<AppState>>>,
              metrics: web::types::State<MetricSender>) -> web::HttpResponse {
    let qs = QueryString::from(req.uri().query().unwrap_or(""));

    let rendered = {
        let state = state.lock().unwrap();
        render_blog(&state.config, &state.store, &qs)
    };

    let (rendered, filtered) = match rendered {
        Ok(x) => x,
        Err(e) => return web::HttpResponse::InternalServerError()
            .body(format!("Error listing posts: {}", e)),
    };

    metrics.list(filtered, request_origin(&req)).await;
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

fn render_view(config: &Config, store: &PostStore, link: &str) -> io::Result<String> {
    let post = store.by_link(link)
        .ok_or_else(|| io::Error::new(ErrorKind::NotFound, "Could not find post"))?;

    let post_content = render_post_html(post)?;

    let limit = config.defaults.related_limit.unwrap_or(DEFAULT_RELATED_LIMIT) as usize;
    let related = filter::related_posts(store.posts(), post, limit);

    let template_src = read_template(&config.paths.template_dir, "view.tpl")?;
    let renderer = PostRenderer::new(&template_src)?;
    Ok(renderer.render(post, &post_content, &related))
}

#[web::get("/view/{post}/")]
async fn view(req: HttpRequest, post_name: web::types::Path<String>,
              state: web::types::State<Arc<Mutex<AppState>>>,
              metrics: web::types::State<MetricSender>) -> web::HttpResponse {
    let post_name = post_name.into_inner();

    let rendered = {
        let state = state.lock().unwrap();
        render_view(&state.config, &state.store, &post_name)
    };

    let rendered = match rendered {
        Ok(post) => post,
        Err(e) => {
            return web::HttpResponse::BadRequest()
                .body(format!("Error loading post {}: {}", post_name, e));
        }
    };

    metrics.view(post_name, request_origin(&req)).await;
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

fn resolve_page_path(config: &Config, page_name: &str) -> io::Result<PathBuf> {
    if page_name.contains("..") || page_name.contains('/') {
        return Err(io::Error::new(ErrorKind::PermissionDenied, "Access forbidden"));
    }

    let pages_dir = &config.paths.pages_dir;
    let flat = pages_dir.join(format!("{}.md", page_name));
    if flat.is_file() {
        return Ok(flat);
    }

    let index_base = config.defaults.index_base_name.as_deref().unwrap_or(DEFAULT_INDEX_BASE);
    let nested = pages_dir.join(page_name).join(format!("{}.md", index_base));
    if nested.is_file() {
        return Ok(nested);
    }

    Err(io::Error::new(ErrorKind::NotFound, "Could not find page"))
}

fn render_page_view(config: &Config, page_name: &str) -> io::Result<String> {
    let page_path = resolve_page_path(config, page_name)?;
    let raw = fs::read_to_string(&page_path)?;
    let rendered_page = render_page(&raw)?;

    let template_src = read_template(&config.paths.template_dir, "page.tpl")?;
    let renderer = PageRenderer::new(&template_src)?;
    Ok(renderer.render(&rendered_page))
}

#[web::get("/page/{page}/")]
async fn page(req: HttpRequest, page_name: web::types::Path<String>,
              state: web::types::State<Arc<Mutex<AppState>>>,
              metrics: web::types::State<MetricSender>) -> web::HttpResponse {
    let page_name = page_name.into_inner();

    let rendered = {
        let state = state.lock().unwrap();
        render_page_view(&state.config, &page_name)
    };

    let rendered = match rendered {
        Ok(page) => page,
        Err(e) => {
            return web::HttpResponse::BadRequest()
                .body(format!("Error loading page {}: {}", page_name, e));
        }
    };

    metrics.page(page_name, request_origin(&req)).await;
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

#[web::get("/schedule/")]
async fn schedule(state: web::types::State<Arc<Mutex<AppState>>>) -> web::HttpResponse {
    let rendered = {
        let state = state.lock().unwrap();
        read_template(&state.config.paths.template_dir, "schedule.tpl")
            .and_then(|src| Ok(ScheduleRenderer::new(&src)?.render()))
    };

    match rendered {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => web::HttpResponse::InternalServerError()
            .body(format!("Error rendering scheduler: {}", e)),
    }
}

/// One-shot run of the wizard from a posted form. The same gates apply as
/// in the step-by-step flow; the first one that fails aborts the booking.
fn book_from_form(form: &ScheduleForm, today: NaiveDate, backend: &dyn BookingBackend) -> Result<Booking, String> {
    let mut wizard = Wizard::new();

    wizard.select_length(form.duration.parse::<MeetingLength>()?)?;
    wizard.advance()?;

    let date = parse_post_date(&form.date)?;
    wizard.select_date(date, today)?;
    wizard.select_time(&form.time)?;
    wizard.advance()?;

    wizard.set_details(ContactDetails {
        name: form.name.clone(),
        email: form.email.clone(),
        company: form.company.clone().unwrap_or_default(),
        agenda: form.agenda.clone().unwrap_or_default(),
    })?;

    wizard.submit(backend)
}

#[web::post("/schedule")]
async fn schedule_submit(req: HttpRequest, form: web::types::Form<ScheduleForm>,
                         state: web::types::State<Arc<Mutex<AppState>>>,
                         metrics: web::types::State<MetricSender>) -> web::HttpResponse {
    let form = form.into_inner();
    let today = Utc::now().date_naive();

    let rendered = {
        let state = state.lock().unwrap();
        match book_from_form(&form, today, &LoggedBooking) {
            Ok(booking) => {
                read_template(&state.config.paths.template_dir, "confirmed.tpl")
                    .and_then(|src| Ok(ConfirmationRenderer::new(&src)?.render(&booking)))
                    .map_err(|e| format!("Error rendering confirmation: {}", e))
            }
            Err(e) => Err(e),
        }
    };

    let rendered = match rendered {
        Ok(rendered) => rendered,
        Err(e) => {
            return web::HttpResponse::BadRequest()
                .body(format!("Could not schedule the meeting: {}", e));
        }
    };

    metrics.schedule(request_origin(&req)).await;
    web::HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(rendered)
}

#[web::post("/admin/login")]
async fn admin_login(form: web::types::Form<LoginForm>,
                     state: web::types::State<Arc<Mutex<AppState>>>) -> web::HttpResponse {
    let allowed = {
        let state = state.lock().unwrap();
        state.auth.authenticate(&form.username, &form.password)
    };

    if allowed {
        web::HttpResponse::Ok().body("Welcome")
    } else {
        web::HttpResponse::Unauthorized().body("Invalid credentials")
    }
}

#[web::get("/rss")]
async fn rss(req: HttpRequest, state: web::types::State<Arc<Mutex<AppState>>>,
             metrics: web::types::State<MetricSender>) -> web::HttpResponse {
    let rendered = {
        let state = state.lock().unwrap();

        let feed = match state.config.rss_feed {
            Some(ref feed) => feed,
            None => return web::HttpResponse::NotFound().body("No feed configured"),
        };

        let newest_first = filter_posts(state.store.posts(), &Default::default());
        let page_slice = &newest_first[..newest_first.len().min(feed.page_size as usize)];

        let channel = RssChannel {
            ch_title: feed.title.as_str(),
            ch_link: state.config.site.base_url.as_str(),
            ch_desc: feed.description.as_str(),
        };
        channel.render(page_slice)
    };

    let rendered = match rendered {
        Ok(xml) => xml,
        Err(e) => return web::HttpResponse::InternalServerError()
            .body(format!("Error rendering feed: {}", e)),
    };

    metrics.rss(request_origin(&req)).await;
    web::HttpResponse::Ok()
        .content_type("application/rss+xml; charset=utf-8")
        .body(rendered)
}

fn get_file(root_dir: &PathBuf, post: String, file: String) -> Result<NamedFile, web::Error> {
    if post.contains("../") || file.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = root_dir.join(post).join(file);
    Ok(NamedFile::open(file_path)?)
}

#[web::get("/view/{post}/{file}")]
async fn post_files(path: web::types::Path<(String, String)>, state: web::types::State<Arc<Mutex<AppState>>>) -> Result<NamedFile, web::Error> {
    let (post, file) = path.into_inner();
    let state = state.lock().unwrap();
    get_file(&state.config.paths.posts_dir, post, file)
}

#[web::get("/page/{page}/{file}")]
async fn page_files(path: web::types::Path<(String, String)>, state: web::types::State<Arc<Mutex<AppState>>>) -> Result<NamedFile, web::Error> {
    let (page_name, file) = path.into_inner();
    let state = state.lock().unwrap();
    get_file(&state.config.paths.pages_dir, page_name, file)
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: web::types::State<Arc<Mutex<AppState>>>) -> Result<NamedFile, web::Error> {
    if path.contains("../") {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let state = state.lock().unwrap();
    let file_path = state.config.paths.public_dir.join(path.into_inner());

    Ok(NamedFile::open(file_path)?)
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let index_base = config.defaults.index_base_name.as_deref().unwrap_or(DEFAULT_INDEX_BASE).to_string();
    let store = PostStore::load(&config.paths.posts_dir, &index_base);
    info!("Serving {} posts", store.len());

    // The handler must outlive the workers: dropping it closes the channel
    let (metric_sender, _metric_handler) = match config.metrics {
        Some(ref metrics_cfg) if metrics_cfg.location.is_some() => {
            let location = metrics_cfg.location.as_ref().unwrap();
            let writer = MetricWriter::new(location, metrics_cfg.time_slot_secs)
                .map_err(|e| io::Error::new(ErrorKind::Other, format!("Error setting up metrics: {}", e)))?;
            let handler = MetricHandler::new(writer);
            let sender = handler.new_sender();
            (sender, Some(handler))
        }
        _ => (MetricHandler::no_op(), None),
    };

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(Mutex::new(AppState {
        store,
        auth: Box::new(NoAdminAuth),
        config,
    }));

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .state(metric_sender.clone())
            .service(index)
            .service(blog)
            .service(view)
            .service(view_wo_slash)
            .service(post_files)
            .service(page)
            .service(page_wo_slash)
            .service(page_files)
            .service(schedule)
            .service(schedule_submit)
            .service(admin_login)
            .service(rss)
            .service(public_files)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ScheduleForm {
        ScheduleForm {
            duration: "30".to_string(),
            date: "2024-06-10".to_string(),
            time: "10:00 AM".to_string(),
            name: "Dana Fields".to_string(),
            email: "dana@example.com".to_string(),
            company: None,
            agenda: Some("Kickoff".to_string()),
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    struct AcceptAll;

    impl BookingBackend for AcceptAll {
        fn book(&self, _booking: &Booking) -> Result<(), String> {
            Ok(())
        }
    }

    #[test]
    fn test_book_from_form_happy_case() {
        let booking = book_from_form(&form(), monday(), &AcceptAll).unwrap();
        assert_eq!(booking.length.minutes(), 30);
        assert_eq!(booking.date, monday());
        assert_eq!(booking.time, "10:00 AM");
        assert_eq!(booking.details.agenda, "Kickoff");
    }

    #[test]
    fn test_book_from_form_rejects_bad_input() {
        let mut bad_duration = form();
        bad_duration.duration = "45".to_string();
        assert!(book_from_form(&bad_duration, monday(), &AcceptAll).is_err());

        let mut weekend = form();
        weekend.date = "2024-06-15".to_string();
        assert!(book_from_form(&weekend, monday(), &AcceptAll).is_err());

        let mut bad_slot = form();
        bad_slot.time = "07:00 AM".to_string();
        assert!(book_from_form(&bad_slot, monday(), &AcceptAll).is_err());

        let mut no_name = form();
        no_name.name = " ".to_string();
        assert!(book_from_form(&no_name, monday(), &AcceptAll).is_err());
    }
}
