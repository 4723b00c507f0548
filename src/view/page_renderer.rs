use std::io;
use std::io::ErrorKind;

use ramhorns::Template;

use crate::post_render::RenderedPage;

#[derive(ramhorns::Content)]
struct PageItem<'a> {
    title: &'a str,
    page_content: &'a str,
}

pub struct PageRenderer<'a> {
    template: Template<'a>,
}

impl PageRenderer<'_> {
    pub fn new(page_tpl_src: &str) -> io::Result<PageRenderer> {
        let template = match Template::new(page_tpl_src) {
            Ok(x) => x,
            Err(e) => {
                return Err(io::Error::new(ErrorKind::InvalidInput, format!("Error parsing page template: {}", e)));
            }
        };

        Ok(PageRenderer {
            template,
        })
    }

    pub fn render(&self, page: &RenderedPage) -> String {
        self.template.render(&PageItem {
            title: page.title.as_str(),
            page_content: page.html.as_str(),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::post_render::render_page;
    use crate::test_data::PAGE_FIXTURE;

    use super::*;

    #[test]
    fn test_render_page_view() {
        let template_src = "TITLE=[{{title}}]\nCONTENT=[{{{page_content}}}]";
        let renderer = PageRenderer::new(template_src).unwrap();

        let page = render_page(PAGE_FIXTURE).unwrap();
        let res = renderer.render(&page);

        assert!(res.contains("TITLE=[About Nuclian]"));
        assert!(res.contains("<p>We are a software development agency"));
    }
}
