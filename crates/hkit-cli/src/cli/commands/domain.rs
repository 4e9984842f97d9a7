//! `hkit domain` – print top-level domains.

use hkit_core::domain::top_level_domain;

pub fn run_domain(urls: &[String]) {
    for url in urls {
        println!("{}", top_level_domain(url));
    }
}
