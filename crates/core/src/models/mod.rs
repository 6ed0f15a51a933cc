mod user;
mod workout;

pub use user::{current_iat, Location, LoginRecord, NewUser, UserMetadata, UserProfile};
pub use workout::{
    Exercise, ExercisePart, RepUnit, Reps, Weight, WeightUnit, WorkoutPayload, WorkoutSummary,
};
