
#[cfg(test)]
mod tests {
    use crate::event::{AttachOptions, DEFAULT_PRIORITY};

    #[test]
    fn test_default_priority_value() {
        assert_eq!(DEFAULT_PRIORITY, 10);
    }

    #[test]
    fn test_attach_options_builder() {
        let options = AttachOptions::new().priority(3).pass_params(true);
        assert_eq!(options.priority, Some(3));
        assert!(options.pass_params);
        assert_eq!(AttachOptions::default().priority, None);
    }
}
