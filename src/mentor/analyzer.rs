//! Failure analysis against a reference solution
//!
//! Compares the submission with the stored reference line by line (blank and
//! comment lines dropped) and names the first suspicious difference.

use crate::models::SubmissionStatus;

/// Constructs whose absence usually means a missing algorithmic step
const KEY_CONSTRUCTS: [&str; 10] = [
    "set(", "dict", "visited", "sorted", "reversed", "max(", "min(", "for", "while", "if",
];

/// Blocks at least this long are treated as rewrites rather than mistakes
const MAX_BLOCK_CHARS: usize = 80;

const MISSING_STEP_PREVIEW_CHARS: usize = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Insert { from: usize, to: usize },
    Delete,
    Replace { user: (usize, usize), reference: (usize, usize) },
}

/// Explain a failed submission in terms of the reference solution
pub fn analyze_mistake(user_code: &str, reference: &str, status: SubmissionStatus) -> String {
    match status {
        SubmissionStatus::Syntax => "Syntax error in code structure".to_string(),
        SubmissionStatus::Tle => {
            "Algorithm is too slow; likely nested loops or inefficient approach".to_string()
        }
        SubmissionStatus::Runtime => {
            "Code crashes; check array bounds, division by zero, or null references".to_string()
        }
        SubmissionStatus::WrongAnswer | SubmissionStatus::Accepted => {
            compare_logic(user_code, reference)
        }
    }
}

fn significant_lines(code: &str) -> Vec<&str> {
    code.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .collect()
}

fn compare_logic(user_code: &str, reference: &str) -> String {
    let user = significant_lines(user_code);
    let correct = significant_lines(reference);

    for op in line_opcodes(&user, &correct) {
        match op {
            Op::Insert { from, to } => {
                let missing = correct[from..to].join(" ");
                if missing.len() < MAX_BLOCK_CHARS
                    && KEY_CONSTRUCTS.iter().any(|kw| missing.contains(kw))
                {
                    let preview: String = missing.chars().take(MISSING_STEP_PREVIEW_CHARS).collect();
                    return format!("Missing key step: {}", preview);
                }
            }
            Op::Replace { user: (i1, i2), reference: (j1, j2) } => {
                let ours = user[i1..i2].join(" ");
                let theirs = correct[j1..j2].join(" ");
                if ours.len() < MAX_BLOCK_CHARS && theirs.len() < MAX_BLOCK_CHARS {
                    return "Logic differs from correct approach".to_string();
                }
            }
            Op::Equal | Op::Delete => {}
        }
    }

    "Logic error; trace through with a sample input step-by-step".to_string()
}

/// Edit script turning `a` into `b`, built from a longest common subsequence
///
/// Adjacent deletions and insertions are merged into a single replace.
fn line_opcodes(a: &[&str], b: &[&str]) -> Vec<Op> {
    let (n, m) = (a.len(), b.len());
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if a[i] == b[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut ops = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n || j < m {
        if i < n && j < m && a[i] == b[j] {
            ops.push(Op::Equal);
            i += 1;
            j += 1;
            continue;
        }

        let (del_start, ins_start) = (i, j);
        while (i < n || j < m) && !(i < n && j < m && a[i] == b[j]) {
            if j >= m || (i < n && lcs[i + 1][j] >= lcs[i][j + 1]) {
                i += 1;
            } else {
                j += 1;
            }
        }

        ops.push(match (i > del_start, j > ins_start) {
            (true, true) => Op::Replace {
                user: (del_start, i),
                reference: (ins_start, j),
            },
            (true, false) => Op::Delete,
            (false, true) => Op::Insert {
                from: ins_start,
                to: j,
            },
            (false, false) => unreachable!("loop always advances"),
        });
    }

    ops
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_specific_messages() {
        assert!(analyze_mistake("", "", SubmissionStatus::Tle).starts_with("Algorithm is too slow"));
        assert!(analyze_mistake("", "", SubmissionStatus::Runtime).starts_with("Code crashes"));
    }

    #[test]
    fn test_missing_key_step() {
        let user = "n = int(input())\nprint(n)";
        let reference = "n = int(input())\n# guard\nif n < 0:\n    n = -n\nprint(n)";
        assert_eq!(
            analyze_mistake(user, reference, SubmissionStatus::WrongAnswer),
            "Missing key step: if n < 0: n = -n"
        );
    }

    #[test]
    fn test_short_replacement() {
        let user = "a = 1\nprint(a + 1)";
        let reference = "a = 1\nprint(a * 2 + 1)";
        assert_eq!(
            analyze_mistake(user, reference, SubmissionStatus::WrongAnswer),
            "Logic differs from correct approach"
        );
    }

    #[test]
    fn test_identical_code_gets_generic_advice() {
        let code = "print(sum(map(int, input().split())))";
        assert_eq!(
            analyze_mistake(code, code, SubmissionStatus::WrongAnswer),
            "Logic error; trace through with a sample input step-by-step"
        );
    }

    #[test]
    fn test_opcodes_merge_delete_and_insert() {
        let ops = line_opcodes(&["a", "x", "c"], &["a", "y", "c"]);
        assert_eq!(
            ops,
            vec![
                Op::Equal,
                Op::Replace {
                    user: (1, 2),
                    reference: (1, 2)
                },
                Op::Equal
            ]
        );
    }

    #[test]
    fn test_opcodes_pure_insert_and_delete() {
        assert_eq!(
            line_opcodes(&["a"], &["a", "b"]),
            vec![Op::Equal, Op::Insert { from: 1, to: 2 }]
        );
        assert_eq!(line_opcodes(&["a", "b"], &["b"]), vec![Op::Delete, Op::Equal]);
    }
}
