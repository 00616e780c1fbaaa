use std::path::Path;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::{Error, Figment, Metadata, Provider};
use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};

use crate::{CONFIG_FILE, POSTS_DIR, SITE_DIR};

/// prefix for environment overrides, eg `ELX_STRUCTURE__SITE=public`
pub const ENV_PREFIX: &str = "ELX_";

/// contents of the `config.toml` written by `init`
pub const DEFAULT_CONFIG: &str = r#"title = "An Elx Static Site"
publisher = "Jerry Q. Hacker"
"#;

/// config for managing the site
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    pub title: String,
    pub publisher: String,
    #[serde(default)]
    pub structure: ConfigStructure,
    #[serde(default)]
    pub markdown: ConfigMarkdown,
}

/// where the build reads from and writes to, relative to the site root
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigStructure {
    /// the directory that holds the markdown posts
    pub posts: String,
    /// the output directory for the rendered html
    pub site: String,
}

/// markdown extensions to enable while parsing
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigMarkdown {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub smart_punctuation: bool,
    /// `# Heading {#id}` style attributes
    pub heading_attributes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "An Elx Static Site".into(),
            publisher: "Jerry Q. Hacker".into(),
            structure: ConfigStructure::default(),
            markdown: ConfigMarkdown::default(),
        }
    }
}

impl Default for ConfigStructure {
    fn default() -> Self {
        Self {
            posts: POSTS_DIR.into(),
            site: SITE_DIR.into(),
        }
    }
}

impl Default for ConfigMarkdown {
    fn default() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            tasklists: true,
            smart_punctuation: true,
            heading_attributes: true,
        }
    }
}

impl Config {
    /// defaults, then `<base>/config.toml`, then `ELX_` environment variables
    pub fn figment(base: impl AsRef<Path>) -> Figment {
        Figment::from(Self::default())
            .merge(Toml::file(base.as_ref().join(CONFIG_FILE)))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load(base: impl AsRef<Path>) -> crate::error::Result<Self> {
        Ok(Self::figment(base).extract()?)
    }
}

impl Provider for Config {
    fn metadata(&self) -> Metadata {
        Metadata::named("Elx config")
    }
    fn data(&self) -> Result<figment::value::Map<figment::Profile, figment::value::Dict>, Error> {
        Serialized::defaults(self).data()
    }
}

impl ConfigMarkdown {
    pub fn options(&self) -> Options {
        let mut options = Options::empty();
        let toggles = [
            (self.tables, Options::ENABLE_TABLES),
            (self.footnotes, Options::ENABLE_FOOTNOTES),
            (self.strikethrough, Options::ENABLE_STRIKETHROUGH),
            (self.tasklists, Options::ENABLE_TASKLISTS),
            (self.smart_punctuation, Options::ENABLE_SMART_PUNCTUATION),
            (self.heading_attributes, Options::ENABLE_HEADING_ATTRIBUTES),
        ];
        for (enabled, option) in toggles {
            if enabled {
                options.insert(option);
            }
        }
        options
    }
}
