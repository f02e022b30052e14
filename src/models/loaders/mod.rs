pub mod toml_loader;

pub use toml_loader::{load_exam_job, load_exam_jobs, load_lesson_file, load_question_bank};
