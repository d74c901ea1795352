//! NEIS 給食食単（mealServiceDietInfo）取得モジュール
//!
//! - `client`: 上流URLの組み立てとプロキシ経由の GET
//! - `parser`: XML から `MealRow` の一覧を取り出す

pub mod client;
pub mod model;
pub mod parser;

pub use client::{build_upstream_url, format_query_date, wrap_with_proxy, MealClientTrait, NeisMealClient};
pub use model::MealRow;
pub use parser::parse_xml_data;
