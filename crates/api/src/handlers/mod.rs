pub mod seo;
