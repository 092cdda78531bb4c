pub mod activities;
pub mod consultants;
pub mod dashboard;
pub mod doctors;
