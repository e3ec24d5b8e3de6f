mod category;
mod dealer;
mod employee;
mod product;
mod sale;
mod section;
mod showroom;
mod supply;

pub use category::{CreateCategory, ProductCategory};
pub use dealer::{CreateDealer, Dealer};
pub use employee::{CreateEmployee, Employee};
pub use product::{CreateProduct, Product, SellRequest};
pub use sale::{CreateSale, CreateSaleItem, ProductSale, ProductSaleItem};
pub use section::Section;
pub use showroom::{CreateShowroom, Showroom};
pub use supply::{CreateSupply, CreateSupplyItem, ProductSupply, ProductSupplyItem};
