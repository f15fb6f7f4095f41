// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn traversal_outside_root_is_refused() {
    assert!(!validate_folder_path("/root/../etc/passwd", "/root"));
}

#[test]
fn root_itself_is_refused() {
    assert!(!validate_folder_path("/root", "/root"));
}

#[test]
fn root_with_trailing_slash_is_refused() {
    assert!(!validate_folder_path("/root/", "/root"));
}

#[test]
fn direct_child_is_accepted() {
    assert!(validate_folder_path("/root/a", "/root"));
}

#[test]
fn prefix_match_sibling_is_refused() {
    assert!(!validate_folder_path("/root-evil/x", "/root"));
}

#[test]
fn nested_descendant_is_accepted() {
    assert!(validate_folder_path("/root/a/b/c", "/root"));
}
