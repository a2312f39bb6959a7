use crate::submission::{Submission, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Review category of a submission. Always derived, never read from input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Diploma,
    Coursework,
    Homework,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Diploma, Category::Coursework, Category::Homework];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Diploma => "diploma",
            Category::Coursework => "coursework",
            Category::Homework => "homework",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diploma" => Ok(Category::Diploma),
            "coursework" => Ok(Category::Coursework),
            "homework" => Ok(Category::Homework),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Case-insensitive set of base module identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleSet {
    modules: BTreeSet<String>,
}

impl ModuleSet {
    pub fn new<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for module in modules {
            set.insert(module.as_ref());
        }
        set
    }

    /// Returns false when the module was already present.
    pub fn insert(&mut self, module: &str) -> bool {
        let key = normalize(module);
        if key.is_empty() {
            return false;
        }
        self.modules.insert(key)
    }

    pub fn remove(&mut self, module: &str) -> bool {
        self.modules.remove(&normalize(module))
    }

    pub fn contains(&self, module: &str) -> bool {
        self.modules.contains(&normalize(module))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }
}

fn normalize(module: &str) -> String {
    module.trim().to_lowercase()
}

/// Strip a trailing `-<digits>` variant suffix from a module identifier.
///
/// `"fcpp-12"` becomes `"fcpp"`; `"fcpp-ab"`, `"fcpp"` and `""` are returned unchanged.
pub fn base_module(module: &str) -> &str {
    match module.rsplit_once('-') {
        Some((base, suffix))
            if !suffix.is_empty() && suffix.chars().all(|c| c.is_ascii_digit()) =>
        {
            base
        }
        _ => module,
    }
}

/// Assigns categories from the task-type tag and the configured module sets.
#[derive(Debug, Clone, Default)]
pub struct SubmissionClassifier {
    diploma_modules: ModuleSet,
    self_assignment_modules: ModuleSet,
}

impl SubmissionClassifier {
    pub fn new(diploma_modules: ModuleSet, self_assignment_modules: ModuleSet) -> Self {
        Self {
            diploma_modules,
            self_assignment_modules,
        }
    }

    pub fn diploma_modules(&self) -> &ModuleSet {
        &self.diploma_modules
    }

    pub fn self_assignment_modules(&self) -> &ModuleSet {
        &self.self_assignment_modules
    }

    /// `None` means the record is unclassified and stays out of every report.
    pub fn classify(&self, record: &Submission) -> Option<Category> {
        let base = base_module(&record.module);
        match record.task_type {
            TaskType::Diploma if self.diploma_modules.contains(base) => Some(Category::Diploma),
            TaskType::Diploma => Some(Category::Coursework),
            TaskType::Homework => Some(Category::Homework),
            TaskType::Other(_) => None,
        }
    }

    /// Modules where reviewers pick work up themselves; unassigned is normal there.
    pub fn is_self_assignment(&self, record: &Submission) -> bool {
        self.self_assignment_modules
            .contains(base_module(&record.module))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_module_only_strips_numeric_suffix() {
        assert_eq!(base_module("fcpp-12"), "fcpp");
        assert_eq!(base_module("fonecmid-prod"), "fonecmid-prod");
        assert_eq!(base_module("diplom-da-3"), "diplom-da");
        assert_eq!(base_module("fcpp-"), "fcpp-");
        assert_eq!(base_module("-7"), "");
    }

    #[test]
    fn module_set_ignores_case_and_blanks() {
        let mut set = ModuleSet::new(["FCPP", " sql "]);
        assert!(set.contains("fcpp"));
        assert!(set.contains("SQL"));
        assert!(!set.insert(""));
        assert!(!set.insert("Fcpp"));
        assert_eq!(set.len(), 2);
        assert!(set.remove("sql"));
        assert!(!set.contains("sql"));
    }

    #[test]
    fn category_parses_from_config_keys() {
        assert_eq!("Homework".parse::<Category>(), Ok(Category::Homework));
        assert!("course".parse::<Category>().is_err());
    }
}
