pub mod consult_llm;
pub mod db;
pub mod disabled;
pub mod meal_llm;
pub mod pdf;

pub use consult_llm::OpenAiConsultAdapter;
pub use db::DbAdapter;
pub use disabled::DisabledAiAdapter;
pub use meal_llm::OpenAiMealPlanAdapter;
pub use pdf::PdfTextAdapter;
