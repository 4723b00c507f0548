use std::fmt::{Display, Formatter, Write};
use std::fs::{create_dir, File};
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Name of the author. If empty, OS user real name is being used
    #[arg(short, long)]
    author: Option<String>,

    /// Title of the post
    #[arg(short, long)]
    title: Option<String>,

    /// Category shown on the listing card
    #[arg(short, long)]
    category: Option<String>,

    /// Post generation options
    #[arg(short, long, default_value_t = PostOutput::Stdout)]
    output: PostOutput,
}

#[derive(Clone, Debug, ValueEnum)]
enum PostOutput {
    /// Writes the new post content to the stdout
    Stdout,
    /// Writes the new post content to a file (posts without images)
    File,
    /// Writes the new post content to a directory (posts with images)
    Dir,
}

impl Display for PostOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "")
    }
}

fn get_author(args: &Args) -> String {
    if let Some(ref author) = args.author {
        return author.clone();
    }

    let name = whoami::realname();
    if name.is_empty() {
        return whoami::username();
    }
    name
}

fn render_header(id: &str, author: &str, date: &str, category: &str, title: Option<&str>) -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "<!--");
    let _ = writeln!(&mut buf, "[ID]: # ({})", id);
    let _ = writeln!(&mut buf, "[DATE]: # ({})", date);
    let _ = writeln!(&mut buf, "[AUTHOR]: # ({})", author);
    let _ = writeln!(&mut buf, "[CATEGORY]: # ({})", category);
    let _ = writeln!(&mut buf, "[TAGS]: # ()");
    let _ = writeln!(&mut buf, "[EXCERPT]: # ()");
    let _ = writeln!(&mut buf, "[FEATURED]: # (false)");
    let _ = writeln!(&mut buf, "-->");
    let _ = writeln!(&mut buf);
    if let Some(title) = title {
        let _ = writeln!(&mut buf, "# {}", title);
    } else {
        let _ = writeln!(&mut buf, "# Replace with title");
    }
    let _ = writeln!(&mut buf);
    buf
}

fn render_body() -> String {
    let mut buf = String::new();

    let _ = writeln!(&mut buf, "This is the listing preview");
    let _ = writeln!(&mut buf, "Please remove it and replace with your content");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "<!-- more -->");
    let _ = writeln!(&mut buf);
    let _ = writeln!(&mut buf, "And this is the rest of your post");

    buf
}

fn post_link_from_title(title: &str, date: &NaiveDate) -> String {
    let alpha_chars: String = title.chars()
        .filter(|&c| c.is_alphanumeric() || c == ' ')
        .map(|c| if c == ' ' { '_' } else { c })
        .map(|c| c.to_ascii_lowercase())
        .collect();

    let mut link = String::new();
    let mut prev_char = None;

    for c in alpha_chars.chars() {
        if c != '_' || prev_char != Some('_') {
            link.push(c);
        }
        prev_char = Some(c);
    }

    let link = unidecode::unidecode(&link);
    let date = date.format("%Y%m%d");

    format!("{}_{}", date, link)
}

fn main() {
    let args = Args::parse();

    let id = Uuid::new_v4().to_string();
    let author = get_author(&args);
    let category = args.category.clone().unwrap_or_default();
    let date = Utc::now();
    let date_str = date.format("%b %-d, %Y").to_string();

    let req_title = !matches!(args.output, PostOutput::Stdout);
    if req_title && args.title.is_none() {
        eprintln!("For file and dir outputs, title is required");
        return;
    }

    let header = render_header(&id, &author, &date_str, &category, args.title.as_deref());
    let body = render_body();

    match args.output {
        PostOutput::Stdout => {
            println!("{}", header);
            println!("{}", body);
        }
        PostOutput::File => {
            use std::io::Write;
            let file_name = post_link_from_title(args.title.unwrap().as_str(), &date.date_naive());
            let file_name = format!("{}.md", file_name);
            println!("Creating file {}", file_name);
            let mut file = File::create(&file_name).unwrap();
            file.write_all(header.as_bytes()).unwrap();
            file.write_all(body.as_bytes()).unwrap();
        }
        PostOutput::Dir => {
            use std::io::Write;
            let dir_name = post_link_from_title(args.title.unwrap().as_str(), &date.date_naive());
            let file_name = "index.md";
            let full_path: PathBuf = PathBuf::from(&dir_name).join(file_name);
            println!("Creating dir post {}", full_path.to_str().unwrap());
            create_dir(dir_name).expect("Error create directory");
            let mut file = File::create(&full_path).unwrap();
            file.write_all(header.as_bytes()).unwrap();
            file.write_all(body.as_bytes()).unwrap();
        }
    };
}
