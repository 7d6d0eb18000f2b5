//! Navigation operations implementation

use crate::navigate::results::Breadcrumb;

fn url_segments(url_path: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = url_path.split('/').collect();

    // "/media" splits into ["", "media"]
    if segments.first() == Some(&"") {
        segments.remove(0);
    }
    // "/media/" ends with an empty segment
    if segments.last() == Some(&"") {
        segments.pop();
    }

    segments
}

/// Breadcrumb trail for a URL path such as `/media/photos/2024/`.
///
/// Each crumb links to the cumulative prefix up to and including its segment.
/// Labels are percent-decoded; URLs are kept as given.
pub fn breadcrumbs(url_path: &str) -> Vec<Breadcrumb> {
    let segments = url_segments(url_path);
    let mut url = String::from("/");

    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            url.push_str(segment);
            url.push('/');
            Breadcrumb {
                label: urlencoding::decode(segment)
                    .map(|label| label.into_owned())
                    .unwrap_or_else(|_| segment.to_string()),
                url: url.clone(),
                is_last: i == segments.len() - 1,
            }
        })
        .collect()
}

/// Parent directory link, or `None` when already at the media root.
pub fn parent_url(url_path: &str) -> Option<String> {
    let segments = url_segments(url_path);
    if segments.len() <= 1 {
        return None;
    }
    Some(format!("/{}/", segments[..segments.len() - 1].join("/")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breadcrumbs_accumulate_urls() {
        let crumbs = breadcrumbs("/media/photos/2024");
        assert_eq!(
            crumbs,
            vec![
                Breadcrumb {
                    label: "media".into(),
                    url: "/media/".into(),
                    is_last: false,
                },
                Breadcrumb {
                    label: "photos".into(),
                    url: "/media/photos/".into(),
                    is_last: false,
                },
                Breadcrumb {
                    label: "2024".into(),
                    url: "/media/photos/2024/".into(),
                    is_last: true,
                },
            ]
        );
    }

    #[test]
    fn test_labels_are_decoded() {
        let crumbs = breadcrumbs("/media/my%20photos");
        assert_eq!(crumbs[1].label, "my photos");
        assert_eq!(crumbs[1].url, "/media/my%20photos/");
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let crumbs = breadcrumbs("/media/");
        assert_eq!(crumbs.len(), 1);
        assert!(crumbs[0].is_last);
        assert_eq!(crumbs[0].url, "/media/");
    }

    #[test]
    fn test_parent_url() {
        assert_eq!(parent_url("/media"), None);
        assert_eq!(parent_url("/media/"), None);
        assert_eq!(parent_url("/media/photos"), Some("/media/".into()));
        assert_eq!(parent_url("/media/photos/2024/"), Some("/media/photos/".into()));
    }
}
