use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// How urgent a task is.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// All priorities in the order the add-task form offers them.
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            other => Err(format!("unknown priority '{}'. Supported: high, medium, low.", other)),
        }
    }
}

/// A single task inside a category tile.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Identifier, unique within the owning category.
    pub id: String,
    /// What needs doing.
    pub title: String,
    pub priority: Priority,
    /// Optional due date.
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Free-text tags, in entry order without duplicates.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Symbolic icon shown on a tile. Resolved to a glyph by the renderer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IconToken {
    #[default]
    Briefcase,
    Code,
    Calendar,
    Clock,
    Palette,
}

impl IconToken {
    pub const ALL: [IconToken; 5] = [
        IconToken::Briefcase,
        IconToken::Code,
        IconToken::Calendar,
        IconToken::Clock,
        IconToken::Palette,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            IconToken::Briefcase => "Briefcase",
            IconToken::Code => "Code",
            IconToken::Calendar => "Calendar",
            IconToken::Clock => "Clock",
            IconToken::Palette => "Palette",
        }
    }
}

/// Named gradient used to paint a tile header.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorToken {
    #[default]
    Blue,
    Green,
    Purple,
    Orange,
    Pink,
    Cyan,
    Teal,
    Indigo,
}

impl ColorToken {
    pub const ALL: [ColorToken; 8] = [
        ColorToken::Blue,
        ColorToken::Green,
        ColorToken::Purple,
        ColorToken::Orange,
        ColorToken::Pink,
        ColorToken::Cyan,
        ColorToken::Teal,
        ColorToken::Indigo,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ColorToken::Blue => "Blue",
            ColorToken::Green => "Green",
            ColorToken::Purple => "Purple",
            ColorToken::Orange => "Orange",
            ColorToken::Pink => "Pink",
            ColorToken::Cyan => "Cyan",
            ColorToken::Teal => "Teal",
            ColorToken::Indigo => "Indigo",
        }
    }

    /// Start and end stops of the gradient, as palette names.
    pub fn gradient(&self) -> (&'static str, &'static str) {
        match self {
            ColorToken::Blue => ("blue-500", "blue-600"),
            ColorToken::Green => ("green-500", "emerald-600"),
            ColorToken::Purple => ("purple-500", "violet-600"),
            ColorToken::Orange => ("orange-500", "red-500"),
            ColorToken::Pink => ("pink-500", "rose-600"),
            ColorToken::Cyan => ("cyan-500", "blue-500"),
            ColorToken::Teal => ("teal-500", "green-600"),
            ColorToken::Indigo => ("indigo-500", "purple-600"),
        }
    }
}

/// A tile on the board: a titled, coloured bucket of tasks.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Category {
    /// Identifier, unique within its grouping.
    pub id: String,
    pub title: String,
    pub color: ColorToken,
    pub icon: IconToken,
    pub tasks: Vec<Task>,
}

impl Category {
    /// Number of tasks in the tile.
    pub fn count(&self) -> usize {
        self.tasks.len()
    }
}

/// The four independent groupings a board can be viewed under.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum ViewType {
    WorkType,
    Technology,
    Timeline,
    Priority,
}

impl ViewType {
    pub const ALL: [ViewType; 4] = [
        ViewType::WorkType,
        ViewType::Technology,
        ViewType::Timeline,
        ViewType::Priority,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ViewType::WorkType => "Work Type",
            ViewType::Technology => "Technology",
            ViewType::Timeline => "Timeline",
            ViewType::Priority => "Priority",
        }
    }

    pub fn icon(&self) -> IconToken {
        match self {
            ViewType::WorkType => IconToken::Briefcase,
            ViewType::Technology => IconToken::Code,
            ViewType::Timeline => IconToken::Calendar,
            ViewType::Priority => IconToken::Clock,
        }
    }

    /// Position in [`ViewType::ALL`].
    pub fn index(&self) -> usize {
        ViewType::ALL.iter().position(|v| v == self).unwrap_or(0)
    }
}

impl FromStr for ViewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "work-type" | "work" => Ok(ViewType::WorkType),
            "technology" | "tech" => Ok(ViewType::Technology),
            "timeline" => Ok(ViewType::Timeline),
            "priority" => Ok(ViewType::Priority),
            other => Err(format!(
                "unknown grouping '{}'. Supported: work-type, technology, timeline, priority.",
                other
            )),
        }
    }
}

/// The signed-in identity as reported by the identity provider.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    /// Subject identifier.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// What the board header shows for this user.
    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or("Not logged in")
    }
}
