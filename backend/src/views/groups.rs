use super::{field_errors, group_grid, layout};
use crate::modules::{flash::Flash, storage::BlobStore};
use crate::utils::{
    auth::models::Claims,
    chat::models::ChatMessage,
    groups::models::{BrowseFilter, GroupMember, NewGroup, StudyGroup, UserGroups, DEFAULT_MAX_MEMBERS},
    resources::models::{Resource, ResourceType},
    sessions::models::{StudySession, DEFAULT_DURATION_MINUTES},
};
use maud::{html, Markup, PreEscaped};

const CHAT_SCRIPT: &str = r#"
(function () {
  const log = document.getElementById('chat-log');
  const form = document.getElementById('chat-form');
  if (!log || !form) return;
  const groupId = log.dataset.group;
  let last = log.dataset.last || '';

  function append(m) {
    const line = document.createElement('p');
    if (m.is_own_message) line.className = 'own';
    const who = document.createElement('strong');
    who.textContent = m.sender + ' ';
    const when = document.createElement('span');
    when.className = 'muted';
    when.textContent = m.sent_at_display + ' ';
    const body = document.createElement('span');
    body.textContent = m.content;
    line.append(who, when, body);
    log.appendChild(line);
    log.scrollTop = log.scrollHeight;
    last = m.sent_at_iso;
  }

  async function poll() {
    const res = await fetch('/group/' + groupId + '/messages/?last_message_time=' + encodeURIComponent(last));
    if (res.ok) {
      const data = await res.json();
      data.messages.forEach(append);
    }
  }

  form.addEventListener('submit', async function (event) {
    event.preventDefault();
    const res = await fetch(form.action, { method: 'POST', body: new URLSearchParams(new FormData(form)) });
    if (res.ok) {
      form.reset();
      await poll();
    }
  });

  log.scrollTop = log.scrollHeight;
  setInterval(poll, 3000);
})();
"#;

pub fn home_page(featured: &[StudyGroup], user: Option<&Claims>, flash: Option<&Flash>) -> Markup {
    layout(
        "Home",
        user,
        flash,
        html! {
            div.card {
                h1 { "Study together" }
                p { "Find a study group, share resources, chat and plan sessions." }
                p { a href="/browse/" { "Browse all groups" } }
            }
            h2 { "Featured groups" }
            (group_grid(featured, "No public groups yet."))
        },
    )
}

pub fn dashboard_page(groups: &UserGroups, user: &Claims, flash: Option<&Flash>) -> Markup {
    layout(
        "Dashboard",
        Some(user),
        flash,
        html! {
            h2 { "My groups" }
            (group_grid(&groups.joined, "You have not joined any group yet."))
            h2 { "Created by me" }
            (group_grid(&groups.created, "You have not created any group yet."))
        },
    )
}

pub fn browse_page(
    groups: &[StudyGroup],
    subjects: &[String],
    filter: &BrowseFilter,
    user: Option<&Claims>,
    flash: Option<&Flash>,
) -> Markup {
    let selected = filter.subject().unwrap_or_default();
    layout(
        "Browse",
        user,
        flash,
        html! {
            div.card {
                form method="get" action="/browse/" {
                    label for="q" { "Search" }
                    input #q type="search" name="q" value=(filter.query().unwrap_or_default());
                    label for="subject" { "Subject" }
                    select #subject name="subject" {
                        option value="" { "All subjects" }
                        @for subject in subjects {
                            option value=(subject) selected[subject.eq_ignore_ascii_case(selected)] { (subject) }
                        }
                    }
                    p { button type="submit" { "Filter" } }
                }
            }
            (group_grid(groups, "No groups match your search."))
        },
    )
}

pub fn create_group_page(form: Option<&NewGroup>, errors: &[String], user: &Claims) -> Markup {
    let name = form.map(|f| f.name.as_str()).unwrap_or_default();
    let subject = form.map(|f| f.subject.as_str()).unwrap_or_default();
    let description = form.map(|f| f.description.as_str()).unwrap_or_default();
    let max_members = form.map(|f| f.max_members).unwrap_or(DEFAULT_MAX_MEMBERS);
    let is_private = form.map(|f| f.is_private).unwrap_or(false);

    layout(
        "Create group",
        Some(user),
        None,
        html! {
            div.card {
                h2 { "Create a study group" }
                (field_errors(errors))
                form method="post" action="/create/" {
                    label for="name" { "Name" }
                    input #name type="text" name="name" value=(name) maxlength="200" placeholder="Enter group name" required;
                    label for="subject" { "Subject" }
                    input #subject type="text" name="subject" value=(subject) maxlength="100" placeholder="e.g., Mathematics, Physics" required;
                    label for="description" { "Description" }
                    textarea #description name="description" rows="4" placeholder="Describe your study group" { (description) }
                    label for="max_members" { "Maximum members" }
                    input #max_members type="number" name="max_members" min="2" max="100" value=(max_members);
                    label { input type="checkbox" name="is_private" checked[is_private]; " Private group" }
                    p { button type="submit" { "Create" } }
                }
            }
        },
    )
}

pub struct GroupPage<'a> {
    pub group: &'a StudyGroup,
    pub viewer: &'a Claims,
    pub is_member: bool,
    pub members: &'a [GroupMember],
    pub resources: &'a [Resource],
    pub messages: &'a [ChatMessage],
    pub sessions: &'a [StudySession],
    pub blobs: &'a dyn BlobStore,
}

pub fn group_detail_page(page: GroupPage<'_>, flash: Option<&Flash>) -> Markup {
    let group = page.group;
    let is_creator = group.created_by == page.viewer.user_id;
    let base = format!("/group/{}", group.id);

    layout(
        &group.name,
        Some(page.viewer),
        flash,
        html! {
            div.card {
                h1 { (group.name) }
                p { span.badge { (group.subject) } @if group.is_private { " " span.badge { "Private" } } }
                p { (group.description) }
                p.muted {
                    "Created by " (group.creator) " on " (group.created_at.display_date())
                    " · " (group.member_count) " / " (group.max_members) " members"
                }
                @if is_creator {
                    form.inline method="post" action={ (base) "/delete/" } {
                        button type="submit" { "Delete group" }
                    }
                } @else if page.is_member {
                    form.inline method="post" action={ (base) "/leave/" } {
                        button type="submit" { "Leave group" }
                    }
                } @else if group.is_full() {
                    p.muted { "This group is full." }
                } @else {
                    form.inline method="post" action={ (base) "/join/" } {
                        button type="submit" { "Join group" }
                    }
                }
            }

            div.card {
                h2 { "Members" }
                p { @for (i, member) in page.members.iter().enumerate() {
                    @if i > 0 { ", " }
                    (member.username)
                } }
            }

            @if page.is_member {
                (chat_card(group.id, &base, page.messages, page.viewer.user_id))
            }

            (resources_card(&base, page.resources, page.is_member, page.blobs))
            (sessions_card(&base, page.sessions, page.is_member))

            script { (PreEscaped(CHAT_SCRIPT)) }
        },
    )
}

fn chat_card(group_id: i64, base: &str, messages: &[ChatMessage], viewer_id: i64) -> Markup {
    let last = messages.last().map(|m| m.sent_at.iso()).unwrap_or_default();
    html! {
        div.card {
            h2 { "Chat" }
            div #chat-log data-group=(group_id) data-last=(last) {
                @for message in messages {
                    p class=[(message.sender_id == viewer_id).then_some("own")] {
                        strong { (message.sender) " " }
                        span.muted { (message.sent_at.display_time()) " " }
                        span { (message.content) }
                    }
                }
            }
            form #chat-form method="post" action={ (base) "/message/send/" } {
                textarea name="content" rows="2" placeholder="Type your message..." required {}
                p { button type="submit" { "Send" } }
            }
        }
    }
}

fn resources_card(base: &str, resources: &[Resource], is_member: bool, blobs: &dyn BlobStore) -> Markup {
    html! {
        div.card {
            h2 { "Resources" }
            @if resources.is_empty() {
                p.muted { "No resources shared yet." }
            }
            @for resource in resources {
                div {
                    strong { (resource.title) } " "
                    span.badge { (resource.resource_type.label()) }
                    @if !resource.description.is_empty() { p { (resource.description) } }
                    p.muted {
                        @if let Some(file) = &resource.file {
                            a href=(blobs.url(file)) { "Download" } " · "
                        }
                        @if let Some(link) = &resource.link {
                            a href=(link) rel="noopener noreferrer" { (link) } " · "
                        }
                        "shared by " (resource.uploader) " on " (resource.uploaded_at.display_date())
                    }
                }
            }
            @if is_member {
                h3 { "Add a resource" }
                form method="post" action={ (base) "/resource/add/" } enctype="multipart/form-data" {
                    label for="title" { "Title" }
                    input #title type="text" name="title" maxlength="200" required;
                    label for="resource_type" { "Type" }
                    select #resource_type name="resource_type" {
                        @for kind in ResourceType::ALL {
                            option value=(kind.as_str()) { (kind.label()) }
                        }
                    }
                    label for="resource_description" { "Description" }
                    textarea #resource_description name="description" rows="3" {}
                    label for="file" { "File" }
                    input #file type="file" name="file";
                    label for="link" { "Link" }
                    input #link type="url" name="link";
                    p { button type="submit" { "Add resource" } }
                }
            }
        }
    }
}

fn sessions_card(base: &str, sessions: &[StudySession], is_member: bool) -> Markup {
    html! {
        div.card {
            h2 { "Upcoming sessions" }
            @if sessions.is_empty() {
                p.muted { "Nothing scheduled." }
            }
            @for session in sessions {
                div {
                    strong { (session.title) }
                    p.muted {
                        (session.scheduled_time.display_date_time())
                        " · " (session.duration_minutes) " min · planned by " (session.creator)
                    }
                    @if !session.description.is_empty() { p { (session.description) } }
                }
            }
            @if is_member {
                h3 { "Schedule a session" }
                form method="post" action={ (base) "/session/add/" } {
                    label for="session_title" { "Title" }
                    input #session_title type="text" name="title" maxlength="200" required;
                    label for="session_description" { "Description" }
                    textarea #session_description name="description" rows="3" {}
                    label for="scheduled_time" { "When (UTC)" }
                    input #scheduled_time type="datetime-local" name="scheduled_time" required;
                    label for="duration_minutes" { "Duration (minutes)" }
                    input #duration_minutes type="number" name="duration_minutes" min="15" value=(DEFAULT_DURATION_MINUTES);
                    p { button type="submit" { "Schedule" } }
                }
            }
        }
    }
}
