use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Project {
    fn new(title: &str, description: &str, link: &str, tags: &[&str]) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            link: link.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    /// One-line form used for the window title.
    pub fn summary(&self) -> String {
        if self.tags.is_empty() {
            format!("{} - {} -> {}", self.title, self.description, self.link)
        } else {
            format!(
                "{} - {} [{}] -> {}",
                self.title,
                self.description,
                self.tags.join(", "),
                self.link
            )
        }
    }
}

pub fn default_projects() -> Vec<Project> {
    vec![
        Project::new(
            "SecureDAO",
            "FTM OlympusDAO fork.",
            "https://github.com/securedao",
            &["TypeScript", "Solidity", "React"],
        ),
        Project::new(
            "Next Project",
            "Another interesting project with its own unique challenges and solutions.",
            "https://github.com",
            &["Next.js", "Node.js", "MongoDB"],
        ),
        Project::new(
            "Cool Project",
            "A showcase of your best work with detailed implementation.",
            "https://github.com",
            &["Python", "Django", "PostgreSQL"],
        ),
    ]
}

/// At most one project is expanded at a time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accordion {
    open: Option<usize>,
}

impl Accordion {
    /// Opens `id`, or closes it if it is already open. Returns whether `id`
    /// is open afterwards.
    pub fn toggle(&mut self, id: usize) -> bool {
        if self.open == Some(id) {
            self.open = None;
            false
        } else {
            self.open = Some(id);
            true
        }
    }

    pub fn open(&self) -> Option<usize> {
        self.open
    }

    pub fn is_open(&self, id: usize) -> bool {
        self.open == Some(id)
    }

    pub fn close(&mut self) {
        self.open = None;
    }
}
/// Window title while `open` is expanded: `"<base> | <summary>"`, or just
/// `base` when nothing (or an unknown project) is open.
pub fn window_title(base: &str, projects: &[Project], open: Option<usize>) -> String {
    match open.and_then(|id| projects.get(id)) {
        Some(project) => format!("{} | {}", base, project.summary()),
        None => base.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggling_switches_between_projects() {
        let mut accordion = Accordion::default();
        assert!(accordion.toggle(0));
        assert!(accordion.toggle(2));
        assert!(!accordion.is_open(0));
        assert_eq!(accordion.open(), Some(2));
        assert!(!accordion.toggle(2));
        assert_eq!(accordion.open(), None);
    }

    #[test]
    fn window_title_follows_the_open_project() {
        let projects = default_projects();
        let mut accordion = Accordion::default();

        accordion.toggle(0);
        assert_eq!(
            window_title("Folio", &projects, accordion.open()),
            format!("Folio | {}", projects[0].summary())
        );

        accordion.toggle(1);
        assert_eq!(
            window_title("Folio", &projects, accordion.open()),
            format!("Folio | {}", projects[1].summary())
        );

        accordion.toggle(1);
        assert_eq!(window_title("Folio", &projects, accordion.open()), "Folio");
    }

    #[test]
    fn window_title_ignores_unknown_projects() {
        let projects = default_projects();
        assert_eq!(window_title("Folio", &projects, Some(projects.len())), "Folio");
        assert_eq!(window_title("Folio", &[], Some(0)), "Folio");
    }

    #[test]
    fn summary_lists_tags() {
        let project = &default_projects()[0];
        assert_eq!(
            project.summary(),
            "SecureDAO - FTM OlympusDAO fork. [TypeScript, Solidity, React] -> https://github.com/securedao"
        );
    }

    #[test]
    fn tags_are_optional_in_yaml() {
        let project: Project =
            serde_yaml::from_str("title: A\ndescription: B\nlink: https://example.org\n").unwrap();
        assert!(project.tags.is_empty());
        assert_eq!(project.summary(), "A - B -> https://example.org");
    }
}
