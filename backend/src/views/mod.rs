pub mod auth;
pub mod groups;

use crate::modules::flash::Flash;
use crate::utils::auth::models::Claims;
use crate::utils::groups::models::StudyGroup;
use maud::{html, Markup, DOCTYPE};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f6f7f9; color: #1d2330; }
nav { display: flex; gap: 1rem; align-items: center; padding: .75rem 1.5rem; background: #243b6b; }
nav a, nav button { color: #fff; text-decoration: none; background: none; border: 0; font: inherit; cursor: pointer; }
nav .spacer { flex: 1; }
main { max-width: 960px; margin: 1.5rem auto; padding: 0 1rem; }
.card { background: #fff; border-radius: 8px; padding: 1rem 1.25rem; margin-bottom: 1rem; box-shadow: 0 1px 2px rgba(0,0,0,.08); }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; }
.muted { color: #6b7385; font-size: .9rem; }
.badge { display: inline-block; padding: 0 .5rem; border-radius: 999px; background: #e4e9f5; font-size: .8rem; }
.flash { padding: .75rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.flash-success { background: #e3f6e8; }
.flash-info { background: #e4eefb; }
.flash-error { background: #fbe4e4; }
.errors { color: #a11; }
form.inline { display: inline; }
label { display: block; margin: .5rem 0 .25rem; }
input, textarea, select { width: 100%; box-sizing: border-box; padding: .4rem; }
input[type=checkbox] { width: auto; }
#chat-log { max-height: 320px; overflow-y: auto; }
.own { text-align: right; }
"#;

pub fn layout(title: &str, user: Option<&Claims>, flash: Option<&Flash>, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · StudyHub" }
                style { (maud::PreEscaped(STYLE)) }
            }
            body {
                nav {
                    a href="/" { strong { "StudyHub" } }
                    a href="/browse/" { "Browse" }
                    @if user.is_some() {
                        a href="/dashboard/" { "Dashboard" }
                        a href="/create/" { "Create group" }
                    }
                    span.spacer {}
                    @match user {
                        Some(claims) => {
                            span { (claims.username) }
                            form.inline method="post" action="/auth/logout" {
                                button type="submit" { "Log out" }
                            }
                        }
                        None => {
                            a href="/auth/login" { "Log in" }
                            a href="/auth/register" { "Sign up" }
                        }
                    }
                }
                main {
                    @if let Some(flash) = flash {
                        div class=(flash.level.css_class()) { (flash.message) }
                    }
                    (content)
                }
            }
        }
    }
}

pub fn group_card(group: &StudyGroup) -> Markup {
    html! {
        div.card {
            h3 { a href={ "/group/" (group.id) "/" } { (group.name) } }
            p { span.badge { (group.subject) } @if group.is_private { " " span.badge { "Private" } } }
            p { (group.description) }
            p.muted {
                (group.member_count) " / " (group.max_members) " members · by " (group.creator)
            }
        }
    }
}

pub fn group_grid(groups: &[StudyGroup], empty: &str) -> Markup {
    html! {
        @if groups.is_empty() {
            p.muted { (empty) }
        } @else {
            div.grid {
                @for group in groups {
                    (group_card(group))
                }
            }
        }
    }
}

pub fn field_errors(errors: &[String]) -> Markup {
    html! {
        @if !errors.is_empty() {
            ul.errors {
                @for error in errors {
                    li { (error) }
                }
            }
        }
    }
}

/// Flattens validator output into readable lines.
pub fn describe_validation(errors: &validator::ValidationErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .field_errors()
        .iter()
        .map(|(field, errs)| {
            let reasons = errs
                .iter()
                .map(|e| e.code.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            format!("{}: {}", field.replace('_', " "), reasons)
        })
        .collect();
    lines.sort();
    lines
}
