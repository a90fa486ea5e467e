pub mod naturalization;

pub use naturalization::parse_naturalizacao;
