use crate::post::{Post, PostId};

// Compiled-in articles. They keep the server useful with an empty posts
// directory and give the filter engine a realistic data set to chew on in
// tests.
pub fn builtin_posts() -> Vec<Post> {
    vec![
        build_post(
            "1",
            "future_of_web_development",
            "The Future of Web Development: Trends to Watch in 2024",
            "Explore the latest trends shaping web development, from AI integration to progressive web apps and the rise of edge computing.",
            "Alex Thompson",
            "Web Development",
            "Jan 15, 2024",
            &["React", "AI", "Trends", "PWA", "Edge Computing"],
            true,
            "The pace of change in web development has never been faster.\n\n<!-- more -->\n\nEdge runtimes, AI assistants and progressive web apps are reshaping how teams ship for the browser.\n",
        ),
        build_post(
            "2",
            "scalable_mobile_apps_react_native",
            "Building Scalable Mobile Apps with React Native",
            "Learn best practices for creating performant and scalable mobile applications using React Native and modern development patterns.",
            "Sarah Kim",
            "Mobile Development",
            "Jan 12, 2024",
            &["React Native", "Mobile", "Performance", "Scalability", "Cross-platform"],
            false,
            "One codebase, two platforms, and a long list of performance traps to avoid.\n\n<!-- more -->\n\nProfiling early and keeping the bridge quiet are the two habits that pay off most.\n",
        ),
        build_post(
            "3",
            "devops_for_small_teams",
            "DevOps Best Practices for Small Teams",
            "Discover how small development teams can implement effective DevOps practices without overwhelming complexity.",
            "Michael Rodriguez",
            "DevOps",
            "Jan 10, 2024",
            &["DevOps", "CI/CD", "Docker", "Automation", "Small Teams"],
            false,
            "You do not need a platform team to get fast, boring deployments.\n\n<!-- more -->\n\nA single pipeline, containers and one staging environment cover most of the value.\n",
        ),
        build_post(
            "4",
            "ai_powered_design",
            "AI-Powered Design: How Machine Learning is Changing UX",
            "Explore how artificial intelligence is revolutionizing user experience design and creating more personalized interfaces.",
            "Emily Chen",
            "Design",
            "Jan 8, 2024",
            &["AI", "UX Design", "Machine Learning", "Personalization", "UI"],
            false,
            "Interfaces are starting to adapt to the person using them.\n\n<!-- more -->\n\nRecommendation-driven layouts and generated copy are already in production products.\n",
        ),
        build_post(
            "5",
            "data_security_in_the_cloud",
            "Data Security in the Cloud: Essential Practices",
            "Learn about critical security measures every business should implement when moving their data to the cloud.",
            "Alex Thompson",
            "Security",
            "Jan 5, 2024",
            &["Security", "Cloud", "Data Protection", "Best Practices", "Compliance"],
            false,
            "Moving to the cloud moves the threat model, it does not remove it.\n\n<!-- more -->\n\nEncryption at rest, least-privilege access and audit trails are the baseline.\n",
        ),
        build_post(
            "6",
            "rise_of_no_code",
            "The Rise of No-Code Solutions: Opportunities and Limitations",
            "Analyzing the growing no-code movement and its impact on traditional software development practices.",
            "Sarah Kim",
            "Industry Insights",
            "Jan 3, 2024",
            &["No-Code", "Automation", "Business Tools", "Innovation", "Low-Code"],
            false,
            "No-code tools are eating the simple end of software projects.\n\n<!-- more -->\n\nThe ceiling is real, but so is the speed below it.\n",
        ),
    ]
}

fn build_post(id: &str, link: &str, title: &str, excerpt: &str, author: &str,
              category: &str, date: &str, tags: &[&str], featured: bool, body: &str) -> Post {
    Post {
        id: PostId(id.to_string()),
        link: link.to_string(),
        title: title.to_string(),
        excerpt: excerpt.to_string(),
        author: author.to_string(),
        category: category.to_string(),
        date: date.to_string(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        featured,
        body: body.to_string(),
    }
}
