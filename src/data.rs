use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Reserved slot name; its cell always holds the lunch marker.
pub const LUNCH_BREAK: &str = "Lunch Break";

pub const DEFAULT_LAB_CAPACITY: u32 = 30;
pub const DEFAULT_MAX_PER_SUBJECT_PER_DAY: u32 = 2;
pub const DEFAULT_MAX_PER_DAY_SECTION: u32 = 6;
pub const DEFAULT_LECTURE_REQUIREMENT: u32 = 3;

// section -> subject -> value
pub type Unfulfilled = BTreeMap<String, BTreeMap<String, u32>>;
pub type Suggestions = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// A teacher list as found in requests: either one name or many.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TeacherList {
    One(String),
    Many(Vec<String>),
}

impl TeacherList {
    /// Non-blank names in input order.
    pub fn names(&self) -> Vec<String> {
        let raw: Vec<&String> = match self {
            TeacherList::One(name) => vec![name],
            TeacherList::Many(names) => names.iter().collect(),
        };
        raw.into_iter()
            .filter(|n| !n.trim().is_empty())
            .cloned()
            .collect()
    }
}

/// One (day, slot) cell address as used by unavailability windows.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct DaySlot {
    pub day: String,
    pub slot: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Constraints {
    #[serde(default = "default_max_per_subject")]
    pub max_lectures_per_subject_per_day: u32,
    #[serde(default = "default_max_per_day")]
    pub max_lectures_per_day_section: u32,
}

fn default_max_per_subject() -> u32 {
    DEFAULT_MAX_PER_SUBJECT_PER_DAY
}

fn default_max_per_day() -> u32 {
    DEFAULT_MAX_PER_DAY_SECTION
}

fn default_lab_capacity() -> u32 {
    DEFAULT_LAB_CAPACITY
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            max_lectures_per_subject_per_day: DEFAULT_MAX_PER_SUBJECT_PER_DAY,
            max_lectures_per_day_section: DEFAULT_MAX_PER_DAY_SECTION,
        }
    }
}

/// A section as submitted inside a class.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct SectionInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub student_count: u32,
}

/// A class groups sections that share one subject list.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct ClassInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub lab_subjects: Vec<String>,
    #[serde(default)]
    pub sections: Vec<SectionInput>,
}

/// Resources and rules shared by the raw request and the normalized
/// configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Resources {
    #[serde(default)]
    pub labs: Vec<String>,
    #[serde(default)]
    pub lab_rooms: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub teachers: HashMap<String, TeacherList>,
    #[serde(default)]
    pub lab_teachers: HashMap<String, TeacherList>,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub lecture_requirements: HashMap<String, u32>,
    #[serde(default)]
    pub teacher_unavailability: HashMap<String, Vec<DaySlot>>,
    #[serde(default = "default_lab_capacity")]
    pub lab_capacity: u32,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            labs: Vec::new(),
            lab_rooms: HashMap::new(),
            teachers: HashMap::new(),
            lab_teachers: HashMap::new(),
            constraints: Constraints::default(),
            lecture_requirements: HashMap::new(),
            teacher_unavailability: HashMap::new(),
            lab_capacity: DEFAULT_LAB_CAPACITY,
        }
    }
}

/// The class-based request body. Required fields are optional here so that
/// validation can report every missing one.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct TimetableRequest {
    pub classes: Option<Vec<ClassInput>>,
    pub rooms: Option<Vec<String>>,
    pub days: Option<Vec<String>>,
    pub slots: Option<Vec<String>>,
    #[serde(flatten)]
    pub resources: Resources,
}

/// A flattened, schedulable section.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Section {
    pub name: String,
    pub student_count: u32,
    pub subjects: Vec<String>,
    pub lab_subjects: Vec<String>,
}

/// The validated, normalized input every engine phase reads from.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Configuration {
    pub sections: Vec<Section>,
    pub rooms: Vec<String>,
    pub days: Vec<String>,
    pub slots: Vec<String>,
    #[serde(flatten)]
    pub resources: Resources,
}

impl Configuration {
    /// Slots in order with the lunch sentinel removed.
    pub fn teaching_slots(&self) -> Vec<&str> {
        self.slots
            .iter()
            .map(String::as_str)
            .filter(|s| *s != LUNCH_BREAK)
            .collect()
    }

    pub fn is_lab_subject(&self, subject: &str) -> bool {
        self.resources.lab_teachers.contains_key(subject)
    }

    pub fn teacher_unavailable(&self, teacher: Option<&str>, day: &str, slot: &str) -> bool {
        let Some(teacher) = teacher else {
            return false;
        };
        self.resources
            .teacher_unavailability
            .get(teacher)
            .is_some_and(|windows| windows.iter().any(|w| w.day == day && w.slot == slot))
    }

    pub fn lecture_requirement(&self, subject: &str) -> u32 {
        self.resources
            .lecture_requirements
            .get(subject)
            .copied()
            .unwrap_or(DEFAULT_LECTURE_REQUIREMENT)
    }
}

/// One booked entry in the flat output list.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct BookingRow {
    pub section: String,
    pub day: String,
    pub slot: String,
    pub subject: String,
    #[serde(default)]
    pub room: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moved: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Default, PartialEq)]
pub struct Statistics {
    pub total_sections: usize,
    pub total_classes: usize,
    pub total_slots_used: usize,
    pub total_slots_available: usize,
    pub utilization_percentage: f64,
    pub teacher_utilization: BTreeMap<String, usize>,
    pub room_utilization: BTreeMap<String, usize>,
    pub subject_distribution: BTreeMap<String, usize>,
}

/// Outcome of a full generation request.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateOutput {
    pub success: bool,
    pub timetable: Vec<BookingRow>,
    pub unfulfilled: Unfulfilled,
    pub suggestions: Suggestions,
    pub statistics: Statistics,
    pub validation_warnings: Vec<String>,
}

/// Body of a teacher invalidation request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetTeacherRequest {
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub input_data: Option<TimetableRequest>,
    #[serde(default)]
    pub timetable: Vec<BookingRow>,
}
