#![allow(dead_code)]

pub const POST_FIXTURE: &str = r##"<!--
[ID]: # (a63bd715-a3fe-4788-b0e1-2a3153778544)
[DATE]: # (Jan 15, 2024)
[AUTHOR]: # (Alex Thompson)
[CATEGORY]: # (Web Development)
[TAGS]: # (React, AI, Trends, PWA, Edge Computing)
[EXCERPT]: # (Explore the latest trends shaping web development, from AI integration to progressive web apps and the rise of edge computing.)
[FEATURED]: # (true)
-->

# The Future of Web Development: Trends to Watch in 2024

The pace of change in web development has never been faster. Frameworks
ship new rendering models, AI assistants land in every editor, and the
browser keeps absorbing capabilities that used to need native code.

<!-- more -->

Edge computing moves the work closer to the user. Instead of one region
serving the planet, small runtimes at the network edge render pages a few
milliseconds away from the visitor.

Progressive web apps close the gap with native applications a little more
every year. Install prompts, offline support and push notifications are
all table stakes now.
"##;

pub const PAGE_FIXTURE: &str = r##"# About Nuclian

We are a software development agency focused on web, mobile and AI
projects for companies that want to move fast without breaking their
products.

Our team has shipped platforms for startups and enterprises alike.
"##;
