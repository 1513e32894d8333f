pub(crate) mod actor;
pub(crate) mod error;
pub(crate) mod form;
pub(crate) mod group;
pub(crate) mod guard;
pub(crate) mod pagination;
pub(crate) mod post;
pub(crate) mod route;
pub(crate) mod user;
