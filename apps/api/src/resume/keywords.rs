//! Skill and role detection over extracted resume text.
//!
//! Pure string matching against a fixed IT vocabulary: the text is normalized
//! to lower-case, space-separated tokens and each vocabulary phrase must
//! appear as a whole phrase (so "go" does not match inside "google").

use serde::{Deserialize, Serialize};

pub const DEFAULT_ROLE: &str = "IT Professional";

const SKILLS: &[&str] = &[
    // Programming languages
    "python", "java", "javascript", "typescript", "c++", "c#", "go", "rust",
    "ruby", "php", "swift", "kotlin", "scala", "r", "dart", "perl",
    // Web
    "html", "css", "sass", "less", "react", "angular", "vue", "node.js",
    "express", "django", "flask", "spring", "laravel", "asp.net", "graphql",
    // Databases
    "sql", "mysql", "postgresql", "mongodb", "redis", "oracle", "cassandra",
    "dynamodb", "firebase", "neo4j", "elasticsearch",
    // DevOps & cloud
    "docker", "kubernetes", "terraform", "ansible", "jenkins", "gitlab",
    "github actions", "aws", "azure", "gcp", "ibm cloud", "serverless",
    "ci/cd", "helm", "prometheus", "grafana",
    // Data & ML
    "pandas", "numpy", "tensorflow", "pytorch", "scikit-learn", "keras",
    "opencv", "nltk", "spacy", "hadoop", "spark", "kafka", "airflow",
    "tableau", "power bi", "matplotlib", "seaborn",
    // Mobile
    "android", "ios", "react native", "flutter", "xamarin", "ionic",
    // Security
    "cybersecurity", "penetration testing", "ethical hacking", "siem",
    "nmap", "metasploit", "burp suite", "owasp", "soc", "pki", "vpn",
    // Networking
    "tcp/ip", "dns", "dhcp", "vlan", "ospf", "bgp", "mpls", "sdn",
    // Other
    "blockchain", "solidity", "smart contracts", "arduino", "raspberry pi",
    "iot", "computer vision", "nlp", "quantum computing",
];

const ROLES: &[&str] = &[
    "software engineer", "backend developer", "frontend developer",
    "full stack developer", "web developer", "mobile developer",
    "embedded systems engineer", "game developer",
    "data scientist", "machine learning engineer", "ai engineer",
    "data analyst", "data engineer", "business intelligence analyst",
    "research scientist", "quantitative analyst",
    "devops engineer", "site reliability engineer", "cloud engineer",
    "cloud architect", "platform engineer", "release engineer",
    "security engineer", "cybersecurity analyst", "penetration tester",
    "security consultant", "information security officer",
    "network engineer", "systems administrator", "network administrator",
    "it support specialist", "database administrator",
    "technical lead", "engineering manager", "cto",
    "solutions architect", "system architect",
    "qa engineer", "test engineer", "automation engineer",
    "performance engineer", "quality analyst",
    "technical writer", "it consultant", "scrum master",
    "product owner", "it project manager",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub skills: Vec<String>,
    pub roles: Vec<String>,
}

/// Lower-cases and strips punctuation other than `+ # - / .`, which carry
/// meaning in names like "c++", "ci/cd" and "node.js". Sentence punctuation
/// stuck to the end of a word ("Rust.") is dropped.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '_' || matches!(c, '+' | '#' | '-' | '/' | '.') {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .map(|word| word.trim_end_matches('.'))
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn extract_skills_and_roles(text: &str) -> ResumeSummary {
    // Pad so every phrase match can require a space on both sides.
    let haystack = format!(" {} ", normalize_text(text));

    let skills = find_phrases(&haystack, SKILLS);
    let mut roles = find_phrases(&haystack, ROLES);
    if roles.is_empty() {
        roles.push(DEFAULT_ROLE.to_string());
    }

    ResumeSummary { skills, roles }
}

fn find_phrases(haystack: &str, vocabulary: &[&str]) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for phrase in vocabulary {
        let needle = format!(" {phrase} ");
        if haystack.contains(&needle) && !found.iter().any(|f| f == phrase) {
            found.push((*phrase).to_string());
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation() {
        assert_eq!(
            normalize_text("Skills: Python, C++ & Node.js!"),
            "skills python c++ node.js"
        );
    }

    #[test]
    fn test_normalize_drops_trailing_periods() {
        assert_eq!(normalize_text("I write Rust."), "i write rust");
    }

    #[test]
    fn test_whole_word_matching() {
        let s = extract_skills_and_roles("Worked at Google on Golang services");
        assert!(!s.skills.contains(&"go".to_string()));
    }

    #[test]
    fn test_symbolic_skills_match() {
        let s = extract_skills_and_roles("Built CI/CD with Docker; wrote C++ and C# tools");
        for expected in ["c++", "c#", "docker", "ci/cd"] {
            assert!(s.skills.contains(&expected.to_string()), "missing {expected}");
        }
    }

    #[test]
    fn test_multi_word_phrases() {
        let s = extract_skills_and_roles(
            "Senior Software Engineer. Shipped React Native apps using GitHub Actions.",
        );
        assert!(s.roles.contains(&"software engineer".to_string()));
        assert!(s.skills.contains(&"react native".to_string()));
        assert!(s.skills.contains(&"github actions".to_string()));
    }

    #[test]
    fn test_vocabulary_order_and_dedup() {
        let s = extract_skills_and_roles("rust python rust java python");
        assert_eq!(s.skills, vec!["python", "java", "rust"]);
    }

    #[test]
    fn test_default_role_when_none_found() {
        let s = extract_skills_and_roles("Sample Resume Skills: Python Java");
        assert_eq!(s.roles, vec![DEFAULT_ROLE]);
        assert_eq!(s.skills, vec!["python", "java"]);
    }
}
