use crate::script::Script;
use crate::step::{Locator, Step};

use super::base::{assert_visible, by_test_id, clear_and_type, click};

/// The login form at `/login`
pub struct LoginPage<'a> {
    script: &'a mut Script,
}

impl<'a> LoginPage<'a> {
    pub fn new(script: &'a mut Script) -> Self {
        Self { script }
    }

    pub fn visit(&mut self) -> &mut Self {
        self.script.push(Step::Visit {
            path: "/login".to_string(),
        });
        self
    }

    pub fn fill_email(&mut self, email: &str) -> &mut Self {
        clear_and_type(self.script, by_test_id("login-email"), email);
        self
    }

    pub fn fill_password(&mut self, password: &str) -> &mut Self {
        clear_and_type(self.script, by_test_id("login-password"), password);
        self
    }

    pub fn submit(&mut self) -> &mut Self {
        click(self.script, by_test_id("login-submit"));
        self
    }

    pub fn login(&mut self, email: &str, password: &str) -> &mut Self {
        self.fill_email(email).fill_password(password).submit()
    }

    pub fn go_to_signup(&mut self) -> &mut Self {
        click(self.script, Locator::css(r#"a[href="/signup"]"#));
        self
    }

    pub fn assert_login_page_visible(&mut self) -> &mut Self {
        assert_visible(self.script, by_test_id("login-email"));
        assert_visible(self.script, by_test_id("login-password"));
        assert_visible(self.script, by_test_id("login-submit"));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_fills_both_fields_then_submits() {
        let mut script = Script::new("login");
        script.login().visit().login("filip@example.com", "Asdf.1234#");

        let names: Vec<String> = script.steps().iter().map(Step::name).collect();
        assert_eq!(
            names,
            vec![
                "visit:/login",
                r#"clear:[data-cy="login-email"]"#,
                r#"type:[data-cy="login-email"]"#,
                r#"clear:[data-cy="login-password"]"#,
                r#"type:[data-cy="login-password"]"#,
                r#"click:[data-cy="login-submit"]"#,
            ]
        );
    }

    #[test]
    fn test_empty_password_is_not_typed() {
        let mut script = Script::new("login");
        script.login().fill_email("a@b.c").fill_password("");
        assert_eq!(script.steps().len(), 3);
    }
}
