//! Storefront
//!
//! Rule core for a small online shop: smart collections that select catalog products by up to
//! three conditions, and a discount calculator that applies percentage, fixed-amount and
//! free-shipping discounts to orders.

pub mod catalog;
pub mod collections;
pub mod config;
pub mod customers;
pub mod discounts;
pub mod fixtures;
pub mod ids;
pub mod orders;
pub mod prelude;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod tags;
