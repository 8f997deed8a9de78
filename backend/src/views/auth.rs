use super::layout;
use crate::modules::flash::Flash;
use maud::{html, Markup};

pub fn login_page(username: &str, error: Option<&str>, flash: Option<&Flash>) -> Markup {
    layout(
        "Log in",
        None,
        flash,
        html! {
            div.card {
                h2 { "Log in" }
                @if let Some(error) = error {
                    p.errors { (error) }
                }
                form method="post" action="/auth/login" {
                    label for="username" { "Username" }
                    input #username type="text" name="username" value=(username) required;
                    label for="password" { "Password" }
                    input #password type="password" name="password" required;
                    p { button type="submit" { "Log in" } }
                }
                p.muted { "No account yet? " a href="/auth/register" { "Sign up" } }
            }
        },
    )
}

pub fn register_page(username: &str, error: Option<&str>) -> Markup {
    layout(
        "Sign up",
        None,
        None,
        html! {
            div.card {
                h2 { "Sign up" }
                @if let Some(error) = error {
                    p.errors { (error) }
                }
                form method="post" action="/auth/register" {
                    label for="username" { "Username" }
                    input #username type="text" name="username" value=(username) minlength="3" maxlength="32" required;
                    label for="password" { "Password" }
                    input #password type="password" name="password" required;
                    p { button type="submit" { "Create account" } }
                }
            }
        },
    )
}
