//! Pure ranking helpers over a fetched page of posts.

use crate::types::{Post, UserPostCount};
use std::collections::HashMap;

/// Count posts per author and keep the `n` most prolific. Authors with equal
/// counts stay in the order they were first seen.
pub fn top_contributors(posts: &[Post], n: usize) -> Vec<UserPostCount> {
    let mut counts: Vec<UserPostCount> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for post in posts {
        match slot.get(post.author.as_str()) {
            Some(&i) => counts[i].post_count += 1,
            None => {
                slot.insert(post.author.as_str(), counts.len());
                counts.push(UserPostCount {
                    author: post.author.clone(),
                    post_count: 1,
                });
            }
        }
    }
    // sort_by is stable
    counts.sort_by(|a, b| b.post_count.cmp(&a.post_count));
    counts.truncate(n);
    counts
}

/// Highest scores first, ties in input order.
pub fn top_by_score(mut posts: Vec<Post>, n: usize) -> Vec<Post> {
    posts.sort_by(|a, b| b.score.cmp(&a.score));
    posts.truncate(n);
    posts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(author: &str, score: i64) -> Post {
        serde_json::from_value(serde_json::json!({
            "title": format!("{}-{}", author, score),
            "author": author,
            "score": score,
        }))
        .unwrap()
    }

    #[test]
    fn worked_example() {
        let posts = vec![post("a", 10), post("b", 5), post("a", 1)];
        let top = top_by_score(posts.clone(), 2);
        assert_eq!(
            top.iter().map(|p| (p.author.as_str(), p.score)).collect::<Vec<_>>(),
            vec![("a", 10), ("b", 5)]
        );
        assert_eq!(
            top_contributors(&posts, 1),
            vec![UserPostCount {
                author: "a".into(),
                post_count: 2
            }]
        );
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let posts = vec![post("c", 1), post("b", 1), post("a", 1), post("b", 1), post("c", 1)];
        let authors: Vec<_> = top_contributors(&posts, 10)
            .into_iter()
            .map(|u| (u.author, u.post_count))
            .collect();
        assert_eq!(
            authors,
            vec![("c".to_string(), 2), ("b".to_string(), 2), ("a".to_string(), 1)]
        );

        let scored = top_by_score(vec![post("x", 3), post("y", 3), post("z", 9)], 3);
        let order: Vec<_> = scored.iter().map(|p| p.author.as_str()).collect();
        assert_eq!(order, vec!["z", "x", "y"]);
    }

    #[test]
    fn empty_and_zero() {
        assert!(top_contributors(&[], 5).is_empty());
        assert!(top_contributors(&[post("a", 1)], 0).is_empty());
        assert!(top_by_score(Vec::new(), 3).is_empty());
    }

    // Compare against a naive ranking over a spread of generated inputs.
    #[test]
    fn matches_naive_ranking() {
        let names = ["ann", "bob", "cy", "dee", "eve", "fay"];
        let mut seed: u64 = 0x9e37_79b9;
        for round in 0..50 {
            let len = round % 23;
            let posts: Vec<Post> = (0..len)
                .map(|_| {
                    seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                    post(names[(seed >> 33) as usize % names.len()], 0)
                })
                .collect();
            let n = round % 5;
            let got = top_contributors(&posts, n);

            let mut first_seen: Vec<&str> = Vec::new();
            for p in &posts {
                if !first_seen.contains(&p.author.as_str()) {
                    first_seen.push(&p.author);
                }
            }
            let mut naive: Vec<(usize, usize, &str)> = first_seen
                .iter()
                .enumerate()
                .map(|(i, a)| (posts.iter().filter(|p| p.author == *a).count(), i, *a))
                .collect();
            naive.sort_by(|x, y| y.0.cmp(&x.0).then(x.1.cmp(&y.1)));
            let expected: Vec<UserPostCount> = naive
                .into_iter()
                .take(n)
                .map(|(c, _, a)| UserPostCount {
                    author: a.to_string(),
                    post_count: c,
                })
                .collect();

            assert_eq!(got, expected);
            assert!(got.iter().map(|u| u.post_count).sum::<usize>() <= posts.len());
            // pure: same input, same output
            assert_eq!(top_contributors(&posts, n), got);
        }
    }
}
