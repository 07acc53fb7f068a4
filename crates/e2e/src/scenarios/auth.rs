//! Login form and session scenarios

use regex::RegexBuilder;
use tracing::info;

use crate::error::{ensure, E2eResult};
use crate::pages::base::by_test_id;
use crate::scenario::{expect_eq, Scenario, ScenarioContext, Setup, Suite, AUTH_COOKIE};
use crate::script::Script;
use crate::step::{Locator, Step, UrlMatch};

const WRONG_EMAIL: &str = "wrong@example.com";
const SPECIAL_PASSWORD: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

fn login_flow(scenario: Scenario, tags: &[&'static str]) -> Scenario {
    scenario.setup(Setup::ClearSession).tags(tags)
}

fn session(scenario: Scenario, setup: Setup, tags: &[&'static str]) -> Scenario {
    scenario.setup(setup).tags(&["session"]).tags(tags)
}

pub fn scenarios() -> Vec<Scenario> {
    const A: Suite = Suite::Auth;

    vec![
        // login form
        login_flow(
            scenario!(A, "auth::login::valid_credentials", login_valid_credentials),
            &["login"],
        ),
        login_flow(scenario!(A, "auth::login::form_elements", login_form_elements), &["login"]),
        login_flow(
            scenario!(A, "auth::login::navigate_to_signup", login_navigate_to_signup),
            &["login"],
        ),
        login_flow(
            scenario!(A, "auth::login::wrong_password", login_wrong_password),
            &["login", "invalid"],
        ),
        login_flow(
            scenario!(A, "auth::login::wrong_email", login_wrong_email),
            &["login", "invalid"],
        ),
        login_flow(
            scenario!(A, "auth::login::unknown_user", login_unknown_user),
            &["login", "invalid"],
        ),
        login_flow(
            scenario!(A, "auth::login::empty_email", login_empty_email),
            &["login", "validation"],
        ),
        login_flow(
            scenario!(A, "auth::login::empty_password", login_empty_password),
            &["login", "validation"],
        ),
        login_flow(
            scenario!(A, "auth::login::both_fields_empty", login_both_fields_empty),
            &["login", "validation"],
        ),
        login_flow(
            scenario!(A, "auth::login::invalid_email_format", login_invalid_email_format),
            &["login", "validation"],
        ),
        login_flow(
            scenario!(A, "auth::login::email_with_plus", login_email_with_plus),
            &["login", "validation"],
        ),
        login_flow(
            scenario!(A, "auth::login::long_email", login_long_email),
            &["login", "boundary"],
        ),
        login_flow(
            scenario!(A, "auth::login::long_password", login_long_password),
            &["login", "boundary"],
        ),
        login_flow(
            scenario!(
                A,
                "auth::login::special_character_password",
                login_special_character_password
            ),
            &["login", "boundary"],
        ),
        login_flow(
            scenario!(A, "auth::login::padded_credentials", login_padded_credentials),
            &["login", "whitespace"],
        ),
        login_flow(scenario!(A, "auth::login::uppercase_email", login_uppercase_email), &["login"]),
        login_flow(
            scenario!(A, "auth::login::password_masked", login_password_masked),
            &["login", "security"],
        ),
        login_flow(
            scenario!(A, "auth::login::sql_injection", login_sql_injection),
            &["login", "security"],
        ),
        login_flow(
            scenario!(A, "auth::login::xss_in_email", login_xss_in_email),
            &["login", "security"],
        ),
        login_flow(
            scenario!(A, "auth::login::repeated_failures", login_repeated_failures),
            &["login", "invalid"],
        ),
        // session persistence
        session(
            scenario!(A, "auth::session::survives_reload", session_survives_reload),
            Setup::LoginTestUser,
            &[],
        ),
        session(
            scenario!(A, "auth::session::survives_navigation", session_survives_navigation),
            Setup::LoginTestUser,
            &["board"],
        ),
        session(
            scenario!(A, "auth::session::stored_in_cookie", session_stored_in_cookie),
            Setup::LoginTestUser,
            &[],
        ),
        session(
            scenario!(A, "auth::session::logout", session_logout),
            Setup::LoginTestUser,
            &["logout"],
        ),
        session(
            scenario!(A, "auth::session::logout_clears_cookie", session_logout_clears_cookie),
            Setup::LoginTestUser,
            &["logout"],
        ),
        session(
            scenario!(A, "auth::session::login_page_public", session_login_page_public),
            Setup::ClearSession,
            &[],
        ),
        session(
            scenario!(A, "auth::session::signup_page_public", session_signup_page_public),
            Setup::ClearSession,
            &[],
        ),
        session(
            scenario!(A, "auth::session::expired_session", session_expired),
            Setup::LoginTestUser,
            &[],
        ),
        session(
            scenario!(A, "auth::session::invalid_token_rejected", session_invalid_token_rejected),
            Setup::LoginTestUser,
            &["board", "security"],
        ),
        session(
            scenario!(A, "auth::session::second_tab", session_second_tab),
            Setup::LoginTestUser,
            &[],
        ),
        session(
            scenario!(A, "auth::session::cookie_flags", session_cookie_flags),
            Setup::LoginTestUser,
            &["security"],
        ),
        session(
            scenario!(A, "auth::session::no_password_in_storage", session_no_password_in_storage),
            Setup::LoginTestUser,
            &["security"],
        ),
        session(
            scenario!(A, "auth::session::hijacked_token", session_hijacked_token),
            Setup::LoginTestUser,
            &["security"],
        ),
        session(
            scenario!(A, "auth::session::remember_me_keeps_session", remember_me_keeps_session),
            Setup::ClearSession,
            &["remember-me"],
        )
        .skip("remember me is not implemented by the application"),
        session(
            scenario!(A, "auth::session::remember_me_off_by_default", remember_me_off_by_default),
            Setup::ClearSession,
            &["remember-me"],
        )
        .skip("remember me is not implemented by the application"),
        // board access
        session(
            scenario!(A, "auth::access::anonymous_public_board", access_anonymous_public_board),
            Setup::ClearSession,
            &["access", "board"],
        ),
        session(
            scenario!(A, "auth::access::private_board_forbidden", access_private_board_forbidden),
            Setup::LoginTestUser,
            &["access", "board", "api"],
        ),
        session(
            scenario!(A, "auth::access::own_private_board", access_own_private_board),
            Setup::LoginTestUser,
            &["access", "board"],
        ),
        session(
            scenario!(A, "auth::access::user_public_board", access_user_public_board),
            Setup::LoginTestUser,
            &["access", "board"],
        ),
    ]
}

fn url_includes(script: &mut Script, fragment: &str) {
    script.push(Step::AssertUrl {
        matcher: UrlMatch::Includes(fragment.to_string()),
    });
}

/// Submit the login form and expect to stay on it
async fn login_rejected(
    ctx: &ScenarioContext,
    label: &str,
    email: &str,
    password: &str,
) -> E2eResult<()> {
    let mut script = ctx.script(label);
    script.login().visit().login(email, password);
    url_includes(&mut script, "/login");
    ctx.run(script).await?;
    Ok(())
}

/// Like [`login_rejected`], with the error banner shown
async fn login_error_shown(
    ctx: &ScenarioContext,
    label: &str,
    email: &str,
    password: &str,
) -> E2eResult<()> {
    let mut script = ctx.script(label);
    script.login().visit().login(email, password);
    url_includes(&mut script, "/login");
    script.push(Step::AssertVisible {
        locator: by_test_id("login-error"),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn login_valid_credentials(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.config.test_user.clone();
    let mut script = ctx.script("valid login");
    script.login().visit().login(&user.email, &user.password);
    script.home().assert_home_page_visible();
    ctx.run(script).await?;
    Ok(())
}

async fn login_form_elements(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("login form");
    script.login().visit().assert_login_page_visible();
    ctx.run(script).await?;
    Ok(())
}

async fn login_navigate_to_signup(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("to signup");
    script.login().visit().go_to_signup();
    url_includes(&mut script, "/signup");
    ctx.run(script).await?;
    Ok(())
}

async fn login_wrong_password(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let email = ctx.config.test_user.email.clone();
    login_error_shown(ctx, "wrong password", &email, "WrongPassword123!").await
}

async fn login_wrong_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let password = ctx.config.test_user.password.clone();
    login_error_shown(ctx, "wrong email", WRONG_EMAIL, &password).await
}

async fn login_unknown_user(ctx: &mut ScenarioContext) -> E2eResult<()> {
    login_error_shown(ctx, "unknown user", "nonexistent@example.com", "RandomPassword123!").await
}

async fn login_empty_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let password = ctx.config.test_user.password.clone();
    let mut script = ctx.script("empty email");
    script.login().visit().fill_password(&password).submit();
    url_includes(&mut script, "/login");
    ctx.run(script).await?;
    Ok(())
}

async fn login_empty_password(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let email = ctx.config.test_user.email.clone();
    let mut script = ctx.script("empty password");
    script.login().visit().fill_email(&email).submit();
    url_includes(&mut script, "/login");
    ctx.run(script).await?;
    Ok(())
}

async fn login_both_fields_empty(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("empty form");
    script.login().visit().submit();
    url_includes(&mut script, "/login");
    ctx.run(script).await?;
    Ok(())
}

async fn login_invalid_email_format(ctx: &mut ScenarioContext) -> E2eResult<()> {
    login_rejected(ctx, "invalid email format", "invalid-email-format", "Password123!").await
}

async fn login_email_with_plus(ctx: &mut ScenarioContext) -> E2eResult<()> {
    login_rejected(ctx, "email with plus", "user+test@example.com", "Password123!").await
}

async fn login_long_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let email = format!("{}@example.com", "a".repeat(100));
    login_rejected(ctx, "long email", &email, "Password123!").await
}

async fn login_long_password(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let email = ctx.config.test_user.email.clone();
    login_rejected(ctx, "long password", &email, &"P".repeat(200)).await
}

async fn login_special_character_password(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let email = ctx.config.test_user.email.clone();
    login_rejected(ctx, "special character password", &email, SPECIAL_PASSWORD).await
}

async fn login_padded_credentials(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.config.test_user.clone();
    let email = format!("  {}  ", user.email);
    let password = format!("  {}  ", user.password);
    login_rejected(ctx, "padded credentials", &email, &password).await
}

async fn login_uppercase_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.config.test_user.clone();
    login_rejected(ctx, "uppercase email", &user.email.to_uppercase(), &user.password).await
}

async fn login_password_masked(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("password masked");
    script.login().visit();
    script.push(Step::AssertAttribute {
        locator: by_test_id("login-password"),
        name: "type".to_string(),
        value: Some("password".to_string()),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn login_sql_injection(ctx: &mut ScenarioContext) -> E2eResult<()> {
    login_rejected(ctx, "sql injection", "' OR '1'='1", "' OR '1'='1").await
}

async fn login_xss_in_email(ctx: &mut ScenarioContext) -> E2eResult<()> {
    login_rejected(ctx, "xss", r#"<script>alert("XSS")</script>"#, "Password123!").await
}

async fn login_repeated_failures(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("repeated failures");
    script.login().visit();
    for _ in 0..3 {
        script.login().login(WRONG_EMAIL, "WrongPassword");
        url_includes(&mut script, "/login");
    }
    ctx.run(script).await?;
    Ok(())
}

async fn session_survives_reload(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("reload");
    script.home().visit().assert_home_page_visible();
    script.push(Step::Reload);
    script.home().assert_home_page_visible();
    script.push(Step::AssertUrl {
        matcher: UrlMatch::Excludes("/login".to_string()),
    });
    ctx.run(script).await?;
    Ok(())
}

async fn session_survives_navigation(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.user_api()?.create_board("Navigation Test").await?;

    let mut script = ctx.script("navigation");
    script.board().visit(board.id).assert_board_loaded();
    script.home().visit().assert_home_page_visible();
    script.board().visit(board.id).assert_board_loaded();
    ctx.run(script).await?;
    Ok(())
}

async fn session_stored_in_cookie(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("cookie");
    script.home().visit().assert_home_page_visible();
    script.push(Step::AssertCookie {
        name: AUTH_COOKIE.to_string(),
        present: true,
    });
    ctx.run(script).await?;
    Ok(())
}

fn logout(script: &mut Script) {
    script.home().visit().assert_home_page_visible();
    script.push(Step::Click {
        locator: by_test_id("logged-user"),
    });
}

async fn session_logout(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("logout");
    logout(&mut script);
    url_includes(&mut script, "/login");
    ctx.run(script).await?;
    Ok(())
}

async fn session_logout_clears_cookie(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("logout clears cookie");
    logout(&mut script);
    script.push(Step::AssertCookie {
        name: AUTH_COOKIE.to_string(),
        present: false,
    });
    ctx.run(script).await?;
    Ok(())
}

async fn session_login_page_public(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("login page");
    script.login().visit().assert_login_page_visible();
    url_includes(&mut script, "/login");
    ctx.run(script).await?;
    Ok(())
}

async fn session_signup_page_public(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("signup page");
    script.push(Step::Visit {
        path: "/signup".to_string(),
    });
    url_includes(&mut script, "/signup");
    ctx.run(script).await?;
    Ok(())
}

async fn session_expired(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("expired session");
    script.home().visit().assert_home_page_visible();
    script
        .push(Step::ClearCookies)
        .push(Step::ClearLocalStorage)
        .push(Step::Reload);
    script.home().assert_home_page_visible();
    ctx.run(script).await?;
    Ok(())
}

async fn session_invalid_token_rejected(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.user_api()?.create_board("Private Test Board").await?;

    let mut script = ctx.script("invalid token");
    script.push(Step::SetCookie {
        name: AUTH_COOKIE.to_string(),
        value: "invalid-token-123".to_string(),
    });
    script.board().visit(board.id);
    script.push(Step::AssertVisible {
        locator: Locator::text_matching("invalid authorization|unauthorized|not authorized")
            .first(),
    });
    ctx.run(script).await?;
    Ok(())
}

/// A second page in the same browser context starts logged in
async fn session_second_tab(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut first = ctx.script("first tab");
    first.home().visit().assert_home_page_visible();
    ctx.run(first).await?;

    let mut second = ctx.script("second tab");
    second.home().visit().assert_home_page_visible();
    second.push(Step::AssertUrl {
        matcher: UrlMatch::Excludes("/login".to_string()),
    });
    ctx.run(second).await?;
    Ok(())
}

async fn session_cookie_flags(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("cookie flags");
    script.home().visit();
    script.push(Step::CaptureCookies {
        label: "session".to_string(),
    });
    let report = ctx.run(script).await?;

    let auth = report
        .cookies("session")
        .iter()
        .find(|c| c.name.contains("token") || c.name.contains("session"));
    if let Some(cookie) = auth {
        info!(
            "Session cookie '{}': httpOnly={} secure={}",
            cookie.name, cookie.http_only, cookie.secure
        );
    }
    Ok(())
}

async fn session_no_password_in_storage(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut script = ctx.script("storage contents");
    script.home().visit().assert_home_page_visible();
    script.push(Step::CaptureLocalStorage {
        label: "after-login".to_string(),
    });
    let report = ctx.run(script).await?;

    let dump = serde_json::to_string(&report.local_storage("after-login"))?.to_lowercase();
    ensure(!dump.contains("password"), || {
        "local storage exposes a password".to_string()
    })
}

/// Replaying a token taken from local storage after the session is cleared
async fn session_hijacked_token(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let mut capture = ctx.script("steal token");
    capture.home().visit();
    capture.push(Step::CaptureLocalStorage {
        label: "before".to_string(),
    });
    let report = ctx.run(capture).await?;
    let stolen = report
        .local_storage("before")
        .and_then(|entries| entries.get("token"))
        .cloned()
        .unwrap_or_default();

    let mut replay = ctx.script("replay token");
    replay
        .push(Step::ClearCookies)
        .push(Step::ClearLocalStorage)
        .push(Step::Log {
            message: format!("replaying a token of {} byte(s)", stolen.len()),
        })
        .push(Step::Reload);
    ctx.run(replay).await?;
    Ok(())
}

async fn remember_me_keeps_session(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.config.test_user.clone();
    let mut script = ctx.script("remember me");
    script.login().visit();
    script.push(Step::Click {
        locator: by_test_id("remember-me"),
    });
    script.login().login(&user.email, &user.password);
    script.home().assert_home_page_visible();
    script.push(Step::Reload);
    script.home().assert_home_page_visible();
    ctx.run(script).await?;
    Ok(())
}

async fn remember_me_off_by_default(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let user = ctx.config.test_user.clone();
    let mut script = ctx.script("remember me default");
    script.login().visit();
    script.push(Step::AssertChecked {
        locator: by_test_id("remember-me"),
        checked: false,
    });
    script.login().login(&user.email, &user.password);
    script.home().assert_home_page_visible();
    ctx.run(script).await?;
    Ok(())
}

/// Board created without a session, so the application treats it as public
async fn public_board_id(ctx: &ScenarioContext) -> E2eResult<i64> {
    Ok(ctx.api.anonymous().create_board("Public Board").await?.id)
}

async fn access_anonymous_public_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board_id = public_board_id(ctx).await?;

    let mut script = ctx.script("anonymous public board");
    script.board().visit(board_id).assert_board_loaded();
    url_includes(&mut script, &format!("/board/{}", board_id));
    ctx.run(script).await?;
    Ok(())
}

async fn access_private_board_forbidden(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let email = ctx.config.test_user.email.clone();
    let board = ctx
        .user_api()?
        .create_board(&format!("Private Board - {}", email))
        .await?;

    let mut script = ctx.script("logout");
    logout(&mut script);
    url_includes(&mut script, "/login");
    ctx.run(script).await?;

    let response = ctx.api.anonymous().get_board_unchecked(board.id).await?;
    expect_eq("status of anonymous board fetch", response.status, 403)?;

    let pattern = RegexBuilder::new("don.t have access")
        .case_insensitive(true)
        .build()
        .map_err(|e| crate::error::E2eError::Config(e.to_string()))?;
    let message = response.error_message().unwrap_or_default();
    ensure(pattern.is_match(message), || {
        format!("unexpected access error message: {:?}", message)
    })
}

async fn access_own_private_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board = ctx.user_api()?.create_board("My Private Board").await?;

    let mut script = ctx.script("own board");
    script.board().visit(board.id).assert_board_loaded();
    url_includes(&mut script, &format!("/board/{}", board.id));
    ctx.run(script).await?;
    Ok(())
}

async fn access_user_public_board(ctx: &mut ScenarioContext) -> E2eResult<()> {
    let board_id = public_board_id(ctx).await?;

    let mut script = ctx.script("user public board");
    script.board().visit(board_id).assert_board_loaded();
    url_includes(&mut script, &format!("/board/{}", board_id));
    ctx.run(script).await?;
    Ok(())
}
