use crate::Error;

/// Maximum nesting depth of a stored comment: roots are depth 0, so depths
/// 0 through 3 are permitted and a reply to a depth-3 comment is rejected.
pub const MAX_DEPTH: u32 = 3;

/// The one depth rule, evaluated from the *parent's* depth. Called with the
/// client's local tree before the optimistic insert, and with the durable
/// store's answer before persisting; both sides must go through here.
pub fn validate_reply_depth(parent_depth: u32) -> Result<(), Error> {
    if parent_depth + 1 > MAX_DEPTH {
        return Err(Error::DepthExceeded { limit: MAX_DEPTH });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replies_below_the_limit_are_accepted() {
        assert_eq!(validate_reply_depth(0), Ok(()));
        assert_eq!(validate_reply_depth(1), Ok(()));
        assert_eq!(validate_reply_depth(2), Ok(()));
    }

    #[test]
    fn reply_to_a_comment_at_the_limit_is_rejected() {
        assert_eq!(
            validate_reply_depth(MAX_DEPTH),
            Err(Error::DepthExceeded { limit: MAX_DEPTH })
        );
        assert_eq!(
            validate_reply_depth(MAX_DEPTH + 1),
            Err(Error::DepthExceeded { limit: MAX_DEPTH })
        );
    }

    #[test]
    fn rejection_message_names_the_limit() {
        let err = validate_reply_depth(MAX_DEPTH).unwrap_err();
        assert!(err.to_string().contains("3 levels deep"));
    }
}
