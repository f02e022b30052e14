pub mod bank;
pub mod document;
pub mod loaders;
pub mod question;

pub use bank::QuestionBank;
pub use document::{DocNode, FormulaAttrs, ListAttrs, Orientation};
pub use loaders::{load_exam_jobs, load_question_bank};
pub use question::{ExamJob, LessonFile, QuestionRecord, StoredQuestion};
