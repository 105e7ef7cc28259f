/// Extends string types with useful functions
pub trait StringExt {
    /// Capitalises the first letter and lowercases the rest
    ///
    /// Mostly useful for normalising element symbols written in whatever case
    /// an upstream code felt like that day.
    ///
    /// ```rust
    /// # use voltools_utils::StringExt;
    /// assert_eq!("fe".capitalise(), "Fe".to_string());
    /// assert_eq!("CL".capitalise(), "Cl".to_string());
    /// assert_eq!("".capitalise(), "".to_string());
    /// ```
    fn capitalise(&self) -> String;

    /// Check if the first non-whitespace character is an a-z/A-Z letter
    ///
    /// ```rust
    /// # use voltools_utils::StringExt;
    /// assert!("  Direct".starts_alphabetic());
    /// assert!(!"  0.25 0.25".starts_alphabetic());
    /// assert!(!"   ".starts_alphabetic());
    /// ```
    fn starts_alphabetic(&self) -> bool;
}

impl<T: AsRef<str>> StringExt for T {
    fn capitalise(&self) -> String {
        let mut c = self.as_ref().chars();
        match c.next() {
            Some(f) => f.to_uppercase().collect::<String>() + &c.as_str().to_lowercase(),
            None => String::new(),
        }
    }

    fn starts_alphabetic(&self) -> bool {
        self.as_ref()
            .trim_start()
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic())
    }
}
