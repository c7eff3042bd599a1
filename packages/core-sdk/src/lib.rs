pub mod analysis;
pub mod config;
pub mod llm;
pub mod models;
pub mod parser;
pub mod report;
pub mod scanner;
pub mod telemetry;

/**
 * \brief SDK 预导入集合，方便外部引用常用模块。
 */
pub mod prelude {
    pub use crate::analysis;
    pub use crate::config;
    pub use crate::llm;
    pub use crate::models;
    pub use crate::parser;
    pub use crate::report;
    pub use crate::scanner;
    pub use crate::telemetry;
}
