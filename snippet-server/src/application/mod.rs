pub(crate) mod auth_service;
pub(crate) mod post_service;

#[cfg(test)]
pub(crate) mod test_support;
