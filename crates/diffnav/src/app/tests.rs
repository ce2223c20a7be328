use super::*;
use diffnav_core::{parse_diff, BranchEntry, CommitEntry, DiffError};
use ratatui::text::Line;
use std::fmt::Write as _;

const SIMPLE: &str = "diff --git a/x.go b/x.go\n--- a/x.go\n+++ b/x.go\n@@ -1,2 +1,2 @@\n-old\n+new\n context\n";

fn files(text: &str) -> Arc<[DiffFile]> {
    parse_diff(text).expect("parse").into()
}

/// A file with three ten-row hunks
fn three_hunks(path: &str) -> String {
    let mut text = format!("diff --git a/{path} b/{path}\n--- a/{path}\n+++ b/{path}\n");
    for start in [1, 101, 201] {
        let _ = writeln!(text, "@@ -{start},9 +{start},9 @@");
        for i in 0..9 {
            let _ = writeln!(text, " line {i}");
        }
    }
    text
}

fn app(height: usize) -> App {
    let mut app = App::new(AppSettings::default());
    app.set_diff_area(80, height);
    app.show();
    app
}

fn commit(hash: &str, subject: &str) -> CommitEntry {
    CommitEntry {
        hash: hash.to_string(),
        short_hash: hash.chars().take(7).collect(),
        author: "Ada".to_string(),
        subject: subject.to_string(),
        date: 1_700_000_000,
        pushed: true,
    }
}

fn act(app: &mut App, action: Action) -> Vec<Task> {
    app.update(Message::Action(action))
}

fn with_commits(app: &mut App, hashes: &[&str]) {
    app.update(Message::CommitsLoaded {
        reference: None,
        result: Ok(hashes.iter().map(|h| commit(h, "subject")).collect()),
    });
}

fn text(lines: &[Line]) -> Vec<String> {
    lines
        .iter()
        .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
        .collect()
}

#[test]
fn test_show_requests_initial_loads() {
    let mut app = App::new(AppSettings::default());
    let tasks = app.show();
    assert_eq!(
        tasks,
        vec![
            Task::LoadWorking,
            Task::LoadBranchName,
            Task::LoadCommits {
                reference: None,
                limit: 100
            },
        ]
    );
    assert_eq!(app.placeholder(), Some(Placeholder::Loading));
    assert_eq!(app.focus, Focus::FileList);
}

#[test]
fn test_simple_modification_view() {
    let mut app = app(10);
    app.update(Message::WorkingLoaded(Ok(files(SIMPLE))));

    let viewport = app.viewport().expect("view");
    assert_eq!(viewport.total_lines(), 4);
    assert!(!viewport.is_virtual());
    assert_eq!(app.hunk_positions(), vec![0]);
    assert_eq!(app.current_hunk(), Some((0, 1)));

    let rows = text(&app.render_diff_pane(80, 10));
    assert_eq!(rows.len(), 4);
    assert!(rows[0].contains("@@ -1,2 +1,2 @@"));
    assert!(rows[1].ends_with("-old"));
    assert!(rows[2].ends_with("+new"));
    assert!(rows[3].ends_with(" context"));

    let header = text(&[app.render_header(80)]).remove(0);
    assert!(header.contains("x.go"));
    assert!(header.contains("hunk 1/1"));
}

#[test]
fn test_empty_working_tree() {
    let mut app = app(10);
    app.update(Message::WorkingLoaded(Ok(files(""))));
    assert_eq!(app.placeholder(), Some(Placeholder::Empty));
}

#[test]
fn test_toggle_view_mode_rebuilds() {
    let mut app = app(10);
    app.update(Message::WorkingLoaded(Ok(files(SIMPLE))));
    act(&mut app, Action::ToggleViewMode);
    assert_eq!(app.view_mode, ViewMode::Split);
    // header, one modification pair, one context pair
    assert_eq!(app.viewport().expect("view").total_lines(), 3);
}

#[test]
fn test_detached_head_reports_head() {
    let mut app = app(10);
    app.update(Message::BranchNameLoaded(Ok(None)));
    assert_eq!(app.branch.as_deref(), Some("HEAD"));
    app.update(Message::BranchNameLoaded(Ok(Some("main".to_string()))));
    assert_eq!(app.branch.as_deref(), Some("main"));
}

#[test]
fn test_focus_transitions() {
    let mut app = app(10);
    act(&mut app, Action::Left);
    assert_eq!(app.focus, Focus::FileList);

    act(&mut app, Action::Right);
    assert_eq!(app.focus, Focus::CommitPicker);
    act(&mut app, Action::Right);
    assert_eq!(app.focus, Focus::DiffPane);
    assert_eq!(app.last_left_focus, Focus::CommitPicker);
    act(&mut app, Action::Left);
    assert_eq!(app.focus, Focus::CommitPicker);
    act(&mut app, Action::Left);
    assert_eq!(app.focus, Focus::FileList);

    let cycle: Vec<Focus> = (0..4)
        .map(|_| {
            act(&mut app, Action::Cycle);
            app.focus
        })
        .collect();
    assert_eq!(
        cycle,
        vec![Focus::CommitPicker, Focus::DiffPane, Focus::FileList, Focus::CommitPicker]
    );
}

#[test]
fn test_entering_picker_loads_stale_preview() {
    let mut app = app(10);
    with_commits(&mut app, &["aaaa", "bbbb"]);
    assert!(app.pending_preview.is_none());

    let tasks = act(&mut app, Action::Right);
    assert_eq!(
        tasks,
        vec![Task::LoadPreview {
            hash: "aaaa".to_string()
        }]
    );
    // Already pending: no duplicate request
    act(&mut app, Action::Left);
    assert!(act(&mut app, Action::Right).is_empty());
}

#[test]
fn test_stale_preview_discarded() {
    let mut app = app(20);
    with_commits(&mut app, &["aaaa", "bbbb"]);
    act(&mut app, Action::Right);
    let tasks = act(&mut app, Action::Down);
    assert_eq!(
        tasks,
        vec![Task::LoadPreview {
            hash: "bbbb".to_string()
        }]
    );

    app.update(Message::PreviewLoaded {
        hash: "aaaa".to_string(),
        result: Ok(files(SIMPLE)),
    });
    assert!(app.preview.is_none());
    assert_eq!(app.placeholder(), Some(Placeholder::Loading));

    app.update(Message::PreviewLoaded {
        hash: "bbbb".to_string(),
        result: Ok(files(SIMPLE)),
    });
    assert_eq!(app.preview.as_ref().map(|p| p.hash.as_str()), Some("bbbb"));
    // commit block, file header, body
    let viewport = app.viewport().expect("preview");
    assert_eq!(viewport.total_lines(), 6 + 2 + 4);
    let rows = text(&app.render_diff_pane(80, 20));
    assert_eq!(rows[0], "commit bbbb");
}

#[test]
fn test_section_keys_switch_tabs_in_commit_list() {
    let mut app = app(10);
    act(&mut app, Action::Right);
    let tasks = act(&mut app, Action::NextSection);
    assert_eq!(app.active_tab, CommitTab::Branches);
    assert_eq!(tasks, vec![Task::LoadBranches]);
    assert_eq!(app.placeholder(), Some(Placeholder::SelectRef));

    act(&mut app, Action::NextSection);
    assert_eq!(app.active_tab, CommitTab::Worktrees);
    act(&mut app, Action::NextSection);
    assert_eq!(app.active_tab, CommitTab::Commits);
    act(&mut app, Action::PrevSection);
    assert_eq!(app.active_tab, CommitTab::Worktrees);
}

#[test]
fn test_section_keys_navigate_hunks_elsewhere() {
    let mut app = app(10);
    app.update(Message::WorkingLoaded(Ok(files(&three_hunks("m.rs")))));
    assert_eq!(app.hunk_positions(), vec![0, 10, 20]);

    let offsets: Vec<usize> = (0..3)
        .map(|_| {
            act(&mut app, Action::NextSection);
            app.viewport().expect("view").offset()
        })
        .collect();
    assert_eq!(offsets, vec![10, 20, 0]);
    assert_eq!(app.active_tab, CommitTab::Commits);

    act(&mut app, Action::PrevSection);
    assert_eq!(app.viewport().expect("view").offset(), 20);
    assert_eq!(app.current_hunk(), Some((2, 3)));
}

#[test]
fn test_next_hunk_wraps_when_target_is_clamped() {
    let mut app = app(15);
    app.update(Message::WorkingLoaded(Ok(files(&three_hunks("m.rs")))));
    act(&mut app, Action::NextSection);
    assert_eq!(app.viewport().expect("view").offset(), 10);
    act(&mut app, Action::NextSection);
    assert_eq!(app.viewport().expect("view").offset(), 15);
    assert_eq!(app.current_hunk(), Some((1, 3)));
    act(&mut app, Action::NextSection);
    assert_eq!(app.viewport().expect("view").offset(), 0);
}

#[test]
fn test_select_directory_toggles_and_shows_aggregate() {
    let mut app = app(40);
    let text = [
        SIMPLE.replace("x.go", "src/a.go"),
        SIMPLE.replace("x.go", "src/b.go"),
        SIMPLE.to_string(),
    ]
    .concat();
    app.update(Message::WorkingLoaded(Ok(files(&text))));

    // src/, src/a.go, src/b.go, x.go
    assert_eq!(app.working.as_mut().expect("tree").visible_nodes().len(), 4);
    let viewport = app.viewport().expect("aggregate");
    assert!(viewport.layout().is_aggregate());
    assert_eq!(viewport.total_lines(), (2 + 4) + (1 + 2 + 4));

    act(&mut app, Action::Select);
    assert_eq!(app.focus, Focus::FileList);
    assert_eq!(app.working.as_mut().expect("tree").visible_nodes().len(), 2);

    act(&mut app, Action::Down);
    act(&mut app, Action::Select);
    assert_eq!(app.focus, Focus::DiffPane);
    assert_eq!(app.view_key, Some(ViewKey::WorkingFile("x.go".to_string())));
}

#[test]
fn test_reload_clamps_selection() {
    let mut app = app(10);
    let text = [
        SIMPLE.replace("x.go", "a.go"),
        SIMPLE.replace("x.go", "b.go"),
        SIMPLE.to_string(),
    ]
    .concat();
    app.update(Message::WorkingLoaded(Ok(files(&text))));
    act(&mut app, Action::Down);
    act(&mut app, Action::Down);
    assert_eq!(app.file_selected, 2);

    let tasks = act(&mut app, Action::Reload);
    assert!(tasks.contains(&Task::LoadWorking));
    app.update(Message::WorkingLoaded(Ok(files(SIMPLE))));
    assert_eq!(app.file_selected, 0);
    assert_eq!(app.view_key, Some(ViewKey::WorkingFile("x.go".to_string())));
}

#[test]
fn test_scroll_position_restored_per_file() {
    let mut app = app(10);
    let text = [three_hunks("a.rs"), three_hunks("b.rs")].concat();
    app.update(Message::WorkingLoaded(Ok(files(&text))));

    act(&mut app, Action::Select);
    act(&mut app, Action::PageDown);
    assert_eq!(app.viewport().expect("view").offset(), 9);

    act(&mut app, Action::Left);
    act(&mut app, Action::Down);
    assert_eq!(app.viewport().expect("view").offset(), 0);
    act(&mut app, Action::Up);
    assert_eq!(app.viewport().expect("view").offset(), 9);

    app.show();
    assert!(app.scroll_cache.len() == 0);
}

#[test]
fn test_directory_view_offset_not_remembered() {
    let mut app = app(10);
    let text = [three_hunks("src/a.rs"), three_hunks("src/b.rs")].concat();
    app.update(Message::WorkingLoaded(Ok(files(&text))));
    assert!(matches!(app.view_key, Some(ViewKey::WorkingDir(_))));

    act(&mut app, Action::PageDown);
    assert_eq!(app.viewport().expect("aggregate").offset(), 9);

    act(&mut app, Action::Down);
    assert_eq!(app.view_key, Some(ViewKey::WorkingFile("src/a.rs".to_string())));
    assert_eq!(app.scroll_cache.len(), 0);

    act(&mut app, Action::Up);
    assert!(matches!(app.view_key, Some(ViewKey::WorkingDir(_))));
    assert_eq!(app.viewport().expect("aggregate").offset(), 0);
}

#[test]
fn test_commit_preview_offset_not_remembered() {
    let mut app = app(10);
    with_commits(&mut app, &["aaaa"]);
    act(&mut app, Action::Right);
    app.update(Message::PreviewLoaded {
        hash: "aaaa".to_string(),
        result: Ok(files(&three_hunks("a.rs"))),
    });
    assert_eq!(app.view_key, Some(ViewKey::CommitPreview("aaaa".to_string())));

    act(&mut app, Action::PageDown);
    assert_eq!(app.viewport().expect("preview").offset(), 9);

    act(&mut app, Action::Left);
    assert!(app.viewport().is_none());
    assert_eq!(app.scroll_cache.len(), 0);

    assert!(act(&mut app, Action::Right).is_empty());
    assert_eq!(app.view_key, Some(ViewKey::CommitPreview("aaaa".to_string())));
    assert_eq!(app.viewport().expect("preview").offset(), 0);
}

#[test]
fn test_commit_drill_in_switches_on_completion() {
    let mut app = app(10);
    with_commits(&mut app, &["aaaa"]);
    act(&mut app, Action::Right);

    let tasks = act(&mut app, Action::Select);
    assert_eq!(
        tasks,
        vec![Task::LoadCommitFiles {
            hash: "aaaa".to_string()
        }]
    );
    assert_eq!(app.commit_mode, CommitMode::List);

    app.update(Message::CommitFilesLoaded {
        hash: "zzzz".to_string(),
        result: Ok(files(SIMPLE)),
    });
    assert_eq!(app.commit_mode, CommitMode::List);

    app.update(Message::CommitFilesLoaded {
        hash: "aaaa".to_string(),
        result: Ok(files(SIMPLE)),
    });
    assert_eq!(app.commit_mode, CommitMode::Files);
    assert_eq!(
        app.view_key,
        Some(ViewKey::CommitFile {
            hash: "aaaa".to_string(),
            file: "x.go".to_string()
        })
    );

    // Section keys navigate hunks while browsing commit files
    act(&mut app, Action::NextSection);
    assert_eq!(app.active_tab, CommitTab::Commits);

    act(&mut app, Action::Back);
    assert_eq!(app.commit_mode, CommitMode::List);
    assert!(!app.should_quit);
    act(&mut app, Action::Back);
    assert!(app.should_quit);
}

#[test]
fn test_branch_select_loads_its_commits() {
    let mut app = app(10);
    with_commits(&mut app, &["aaaa"]);
    act(&mut app, Action::Right);
    act(&mut app, Action::NextSection);
    app.update(Message::BranchesLoaded(Ok(vec![
        BranchEntry {
            name: "main".to_string(),
            is_current: true,
        },
        BranchEntry {
            name: "feature".to_string(),
            is_current: false,
        },
    ])));
    act(&mut app, Action::Down);

    let tasks = act(&mut app, Action::Select);
    assert_eq!(
        tasks,
        vec![Task::LoadCommits {
            reference: Some("feature".to_string()),
            limit: 100
        }]
    );
    assert_eq!(app.active_tab, CommitTab::Commits);
    assert_eq!(app.placeholder(), Some(Placeholder::Loading));

    // A late HEAD log must not replace the branch log
    with_commits(&mut app, &["stale"]);
    assert!(app.commits.is_empty());

    let tasks = app.update(Message::CommitsLoaded {
        reference: Some("feature".to_string()),
        result: Ok(vec![commit("ffff", "feature work")]),
    });
    assert_eq!(
        tasks,
        vec![Task::LoadPreview {
            hash: "ffff".to_string()
        }]
    );
}

#[test]
fn test_timeout_retry_doubles_budget() {
    let mut app = app(10);
    app.update(Message::WorkingLoaded(Err(
        DiffError::timeout("git diff took too long").into()
    )));
    assert!(app.error.is_some());
    let rows = text(&app.render_diff_pane(80, 10)).join("\n");
    assert!(rows.contains("retry with longer timeout"));

    let tasks = act(&mut app, Action::Retry);
    assert_eq!(
        tasks,
        vec![Task::WithTimeout {
            task: Box::new(Task::LoadWorking),
            timeout: Duration::from_secs(20),
        }]
    );
    assert!(!app.error.is_some());

    app.update(Message::WorkingLoaded(Err(DiffError::timeout("again").into())));
    let tasks = act(&mut app, Action::Retry);
    assert_eq!(
        tasks,
        vec![Task::WithTimeout {
            task: Box::new(Task::LoadWorking),
            timeout: Duration::from_secs(40),
        }]
    );
}

#[test]
fn test_git_error_retries_same_task() {
    let mut app = app(10);
    with_commits(&mut app, &["aaaa"]);
    act(&mut app, Action::Right);
    app.update(Message::PreviewLoaded {
        hash: "aaaa".to_string(),
        result: Err(DiffError::git("bad object").into()),
    });
    assert!(app.error.is_some());
    assert_eq!(
        act(&mut app, Action::Retry),
        vec![Task::LoadPreview {
            hash: "aaaa".to_string()
        }]
    );
}

#[test]
fn test_parse_error_raw_view() {
    let mut app = app(10);
    app.update(Message::WorkingLoaded(Err(LoadFailure {
        error: DiffError::parse("invalid hunk header at line 4"),
        raw: Some("@@ -x,1 +1 @@\n+added\n".to_string()),
    })));

    act(&mut app, Action::ViewRaw);
    let rows = text(&app.render_diff_pane(80, 10));
    assert_eq!(rows, vec!["@@ -x,1 +1 @@".to_string(), "+added".to_string()]);

    act(&mut app, Action::Back);
    assert!(!app.should_quit);
    let rows = text(&app.render_diff_pane(80, 10)).join("\n");
    assert!(rows.contains("view raw output"));
}

#[test]
fn test_raw_view_scroll_is_clamped() {
    let mut app = app(10);
    let raw: String = (0..25).map(|i| format!("line {i}\n")).collect();
    app.update(Message::WorkingLoaded(Err(LoadFailure {
        error: DiffError::parse("invalid hunk header at line 1"),
        raw: Some(raw),
    })));
    act(&mut app, Action::ViewRaw);

    act(&mut app, Action::PageDown);
    assert_eq!(app.raw_offset, 9);
    act(&mut app, Action::PageDown);
    act(&mut app, Action::PageDown);
    assert_eq!(app.raw_offset, 15);
    act(&mut app, Action::Down);
    assert_eq!(app.raw_offset, 15);

    act(&mut app, Action::Top);
    assert_eq!(app.raw_offset, 0);
    act(&mut app, Action::Bottom);
    assert_eq!(app.raw_offset, 15);
    let rows = text(&app.render_diff_pane(80, 10));
    assert_eq!(rows.len(), 10);
    assert_eq!(rows[0], "line 15");
    assert_eq!(rows[9], "line 24");
}

#[test]
fn test_help_overlay_swallows_navigation() {
    let mut app = app(10);
    act(&mut app, Action::ToggleHelp);
    assert!(app.show_help);
    act(&mut app, Action::Right);
    assert_eq!(app.focus, Focus::FileList);
    act(&mut app, Action::Back);
    assert!(!app.show_help);
    assert!(!app.should_quit);
    act(&mut app, Action::Quit);
    assert!(app.should_quit);
}
