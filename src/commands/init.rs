//! Initialize a new blog

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::{Blog, CONFIG_FILE};

const CONFIG_TEMPLATE: &str = r#"# Blog Configuration

# URL
## Path segment the site is served under; "" or "/" for the domain root.
## Overridden by the BLOG_BASE_PATH environment variable.
base_path: /miswag-tech-blog

# Directory
source_dir: public
output_dir: out
## Fetch content over HTTP instead of reading source_dir.
## Also set by the BLOG_SITE_URL environment variable.
# source_url: https://example.com/miswag-tech-blog

# Content
cache_collections: true
latest_articles: 3
keyword_preview: 2

# Branding
logo: /logo.png
favicon: /favicon.png

# Writing
highlight:
  theme: base16-ocean.dark
  line_number: false
"#;

const SITE_JSON: &str = r#"{
  "title": "Miswag Tech Blog",
  "bio": "Engineering stories, lessons and deep dives from the team building Miswag."
}
"#;

const FOOTER_JSON: &str = r#"{
  "copyright": "© 2025 Miswag. All rights reserved.",
  "socialLinks": [
    { "name": "GitHub", "url": "https://github.com/" },
    { "name": "LinkedIn", "url": "https://www.linkedin.com/" }
  ]
}
"#;

const CATEGORIES_JSON: &str = r#"[
  { "category_id": 1, "category_name": "Backend Development" },
  { "category_id": 2, "category_name": "Data Engineering" }
]
"#;

const TEAM_JSON: &str = r#"[
  {
    "team_id": 1,
    "team_member_name": "Jane Doe",
    "team_member_position": "Software Engineer",
    "team_member_linkedin": "",
    "team_member_avatar": "jane.png",
    "team_member_bio": "Writes about services, queues and the occasional outage."
  }
]
"#;

const ARTICLES_JSON: &str = r#"[
  {
    "article_id": "hello-world",
    "article_title": "Hello World",
    "author_team_id": 1,
    "category_id": 1,
    "article_created_at": "2025-01-05T09:00:00Z",
    "article_keywords": ["Welcome", "Getting Started", "Markdown"],
    "article_description": "The first article of the blog and a tour of what Markdown bodies support.",
    "article_directory": "hello-world",
    "featured_image": ""
  }
]
"#;

const SAMPLE_ARTICLE: &str = r#"# Hello World

Welcome to the blog! Article bodies live in `data/<article_directory>/index.md`
and images next to them can be referenced with relative paths.

## Code

```go
package main

import "fmt"

func main() {
    fmt.Println("hello, world")
}
```

## Lists

- Fenced code blocks with a language are highlighted
- Links open in a new tab: [Markdown guide](https://commonmark.org/help/)
- [x] Task lists render as checkboxes

> Quotes, tables and footnotes work too.
"#;

/// Initialize a new blog in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join(CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("{:?} already exists", config_path);
    }

    let source = target_dir.join("public");
    let files = [
        (config_path.clone(), CONFIG_TEMPLATE),
        (source.join("content/site.json"), SITE_JSON),
        (source.join("content/footer.json"), FOOTER_JSON),
        (source.join("content/categories.json"), CATEGORIES_JSON),
        (source.join("content/team.json"), TEAM_JSON),
        (source.join("content/articles.json"), ARTICLES_JSON),
        (source.join("data/hello-world/index.md"), SAMPLE_ARTICLE),
    ];

    for (path, content) in files {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;
        tracing::debug!("Created: {:?}", path);
    }
    fs::create_dir_all(source.join("avatars"))?;

    Ok(())
}

/// Run the init command with an existing Blog instance
pub fn run(blog: &Blog) -> Result<()> {
    init_site(&blog.base_dir)
}
