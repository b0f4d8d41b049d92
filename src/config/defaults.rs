//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

pub fn r#false() -> bool {
    false
}

// ============================================================================
// [base] Section Defaults
// ============================================================================

pub mod base {
    pub fn url() -> Option<String> {
        None
    }

    pub fn author() -> String {
        "<YOUR_NAME>".into()
    }

    pub fn language() -> String {
        "en".into()
    }

    pub fn card() -> String {
        "summary".into()
    }
}

// ============================================================================
// [build] Section Defaults
// ============================================================================

pub mod build {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn content() -> PathBuf {
        "content".into()
    }

    pub fn output() -> PathBuf {
        "public".into()
    }

    pub fn assets() -> PathBuf {
        "assets".into()
    }

    pub fn hidden_tag_prefix() -> String {
        "hidden".into()
    }
}

// ============================================================================
// [[sections]] Defaults
// ============================================================================

pub mod sections {
    use super::super::SectionConfig;

    /// A site with no declared sections still gets a `posts` section.
    pub fn list() -> Vec<SectionConfig> {
        vec![SectionConfig::new("posts")]
    }
}

// ============================================================================
// [feed] / [sitemap] Defaults
// ============================================================================

pub mod feed {
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        "feed.rss".into()
    }

    pub fn description_length() -> usize {
        200
    }

    pub fn limit() -> usize {
        100
    }
}

pub mod sitemap {
    use super::super::Indentation;
    use std::path::PathBuf;

    pub fn path() -> PathBuf {
        "sitemap.xml".into()
    }

    pub fn indent() -> Indentation {
        Indentation::Spaces(2)
    }
}

// ============================================================================
// [deploy] Section Defaults
// ============================================================================

pub mod deploy {
    pub fn branch() -> String {
        "main".into()
    }

    pub fn timeout_secs() -> u64 {
        120
    }

    pub fn message() -> String {
        "Publish site".into()
    }
}
