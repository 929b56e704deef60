mod token_container;

pub(crate) use token_container::{
    TokenContainer, STATUS_READY, STATUS_RENEWAL_STOPPED, STATUS_RENEWED,
};
