use serde::{Deserialize, Serialize};

/// Unit of a repetition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RepUnit {
    #[serde(rename = "reps")]
    Reps,
    #[serde(rename = "secs")]
    Secs,
    #[serde(rename = "mins")]
    Mins,
    /// As many reps as possible.
    #[serde(rename = "AMRAP")]
    Amrap,
}

/// Unit of a weight. Older rows spell pounds as `lbs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    #[serde(rename = "lb", alias = "lbs")]
    Lb,
    #[serde(rename = "kg")]
    Kg,
}

/// Stored as a plain number; timed units may be fractional, e.g. 1.5 mins.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reps {
    pub unit: RepUnit,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub unit: WeightUnit,
    pub value: f64,
}

/// One block of sets inside an exercise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExercisePart {
    pub sets: f64,
    pub reps: Reps,
    pub weight: Weight,
}

impl ExercisePart {
    pub fn new(sets: f64, reps: Reps, weight: Weight) -> Self {
        Self { sets, reps, weight }
    }
}

/// An exercise and its ordered parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Identifier from the exercise catalogue, e.g. `SQUAT`.
    pub id: String,
    pub parts: Vec<ExercisePart>,
}

impl Exercise {
    pub fn new(id: impl Into<String>, parts: Vec<ExercisePart>) -> Self {
        Self {
            id: id.into(),
            parts,
        }
    }
}

/// Attributes of a workout row. The name is not among them: it lives in the sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutPayload {
    #[serde(default)]
    pub description: String,
    pub exercises: Vec<Exercise>,
    /// Creation or last modification time.
    pub iat: i64,
}

impl WorkoutPayload {
    pub fn new(description: impl Into<String>, exercises: Vec<Exercise>, iat: i64) -> Self {
        Self {
            description: description.into(),
            exercises,
            iat,
        }
    }

    /// Attaches the name decoded from the sort key.
    pub fn into_summary(self, name: impl Into<String>) -> WorkoutSummary {
        WorkoutSummary {
            name: name.into(),
            description: self.description,
            exercises: self.exercises,
            iat: self.iat,
        }
    }
}

/// A workout as handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub name: String,
    pub description: String,
    pub exercises: Vec<Exercise>,
    pub iat: i64,
}
