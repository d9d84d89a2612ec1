use discogen_core::{DirectoryItem, DirectoryList};

/// Matches every API in the directory.
pub const ALL_APIS: &str = "*";

/// Items of `list` whose id equals `want`, or all of them for `*`.
pub fn select_apis(list: DirectoryList, want: &str) -> Result<Vec<DirectoryItem>, String> {
    if want == ALL_APIS {
        return Ok(list.items);
    }
    let ids: Vec<String> = list.items.iter().map(|item| item.id.clone()).collect();
    let selected: Vec<DirectoryItem> = list.items.into_iter().filter(|item| item.id == want).collect();
    if selected.is_empty() {
        return Err(format!(
            "No APIs matched {want:?}; available APIs are: {}",
            ids.join(", ")
        ));
    }
    Ok(selected)
}
