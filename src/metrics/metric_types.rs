pub struct PostDetail {
    pub post_name: String,
}

pub struct PageDetail {
    pub page_name: String,
}

pub struct ListDetail {
    pub filtered: bool,
}

pub enum EventApi {
    Index,
    List(ListDetail),
    View(PostDetail),
    Page(PageDetail),
    Schedule,
    Rss,
}

pub struct MetricEvent {
    pub api: EventApi,
    pub origin: String,
}
