pub mod embed;
pub mod inspect;

mod util;
