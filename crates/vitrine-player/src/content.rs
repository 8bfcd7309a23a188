//! Static popup content, embedded at compile time

use anyhow::{bail, Context, Result};
use serde::Deserialize;

const INTRO_TOML: &str = include_str!("../content/intro.toml");
const SKILLS_TOML: &str = include_str!("../content/skills.toml");
const GALLERY_TOML: &str = include_str!("../content/gallery.toml");

/// Screenshots per gallery mode
pub const GALLERY_SIZE: usize = 20;

/// "To know about my <topic>, please click the <character>."
#[derive(Debug, Clone, Deserialize)]
pub struct Hint {
    pub topic: String,
    pub character: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CareerEntry {
    pub title: String,
    pub period: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileLink {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntroContent {
    pub name: String,
    pub location: String,
    pub role: String,
    pub experience: String,
    pub summary: String,
    pub hint: Hint,
    pub career: Vec<CareerEntry>,
    pub links: Vec<ProfileLink>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Frontend,
    Backend,
    Devops,
}

impl Category {
    pub const ALL: [Category; 3] = [Self::Frontend, Self::Backend, Self::Devops];

    pub fn label(self) -> &'static str {
        match self {
            Self::Frontend => "Frontend",
            Self::Backend => "Backend",
            Self::Devops => "Devops",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Skill {
    pub label: String,
    pub category: Category,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkillsContent {
    pub title: String,
    pub hint: Hint,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryContent {
    pub title: String,
    pub hint: Hint,
    pub desktop: Vec<String>,
    pub mobile: Vec<String>,
}

/// Everything the three popup panels show
#[derive(Debug, Clone)]
pub struct PanelContent {
    pub intro: IntroContent,
    pub skills: SkillsContent,
    pub gallery: GalleryContent,
}

impl PanelContent {
    /// Parse the embedded content files
    pub fn embedded() -> Result<Self> {
        let intro: IntroContent = toml::from_str(INTRO_TOML).context("Failed to parse intro content")?;
        let skills: SkillsContent =
            toml::from_str(SKILLS_TOML).context("Failed to parse skills content")?;
        let gallery: GalleryContent =
            toml::from_str(GALLERY_TOML).context("Failed to parse gallery content")?;

        for (mode, links) in [("desktop", &gallery.desktop), ("mobile", &gallery.mobile)] {
            if links.len() != GALLERY_SIZE {
                bail!("Gallery {} has {} links, expected {}", mode, links.len(), GALLERY_SIZE);
            }
        }

        Ok(Self {
            intro,
            skills,
            gallery,
        })
    }
}
