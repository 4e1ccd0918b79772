// src/job_discovery/local_generator.rs
//! Offline posting generator used when the search provider is unavailable

use chrono::{DateTime, Duration, Utc};

use crate::types::JobPosting;

pub const GENERATOR_SOURCE: &str = "CareerAI";
const ROUNDS_PER_TEMPLATE: usize = 3;
const ALTERNATE_LOCATIONS: [&str; 5] = ["San Francisco", "New York", "Austin", "Seattle", "Remote"];

struct JobTemplate {
    title: &'static str,
    companies: [&'static str; 5],
    requirements: [&'static str; 5],
    description: &'static str,
    job_type: &'static str,
    salary_bands: [&'static str; 3],
}

const TEMPLATES: [JobTemplate; 8] = [
    JobTemplate {
        title: "Frontend Developer",
        companies: ["TechCorp", "InnovateLabs", "DigitalWave", "CodeCraft", "WebSolutions"],
        requirements: ["React", "TypeScript", "CSS", "JavaScript", "HTML"],
        description: "Build modern web applications using React and TypeScript. Work with a talented team to create user-friendly interfaces.",
        job_type: "Full-time",
        salary_bands: ["$80k-$120k", "$90k-$130k", "$100k-$140k"],
    },
    JobTemplate {
        title: "Full Stack Engineer",
        companies: ["StartupXYZ", "CloudTech", "DataFlow", "AppBuilder", "TechVentures"],
        requirements: ["Node.js", "React", "MongoDB", "Express", "TypeScript"],
        description: "Design and develop full-stack applications. Work on both frontend and backend systems.",
        job_type: "Full-time",
        salary_bands: ["$100k-$150k", "$110k-$160k", "$120k-$170k"],
    },
    JobTemplate {
        title: "Backend Developer",
        companies: ["DataSystems", "APIFirst", "ServerTech", "CloudBase", "MicroServices Inc"],
        requirements: ["Node.js", "Python", "PostgreSQL", "Docker", "AWS"],
        description: "Build scalable backend systems and APIs. Work with microservices architecture.",
        job_type: "Full-time",
        salary_bands: ["$90k-$140k", "$100k-$150k", "$110k-$160k"],
    },
    JobTemplate {
        title: "Software Engineer Intern",
        companies: ["BigTech Inc", "Innovation Labs", "Tech Academy", "Future Systems", "Code School"],
        requirements: ["JavaScript", "Python", "Git", "Data Structures", "Algorithms"],
        description: "Learn and contribute to real-world projects. Mentorship from senior engineers.",
        job_type: "Internship",
        salary_bands: ["$30/hr", "$35/hr", "$40/hr"],
    },
    JobTemplate {
        title: "React Developer",
        companies: ["UIExperts", "Frontend Masters", "Component Co", "React Pros", "Modern Web"],
        requirements: ["React", "Redux", "TypeScript", "Next.js", "Tailwind CSS"],
        description: "Create beautiful and performant React applications. Focus on component architecture.",
        job_type: "Full-time",
        salary_bands: ["$85k-$125k", "$95k-$135k", "$105k-$145k"],
    },
    JobTemplate {
        title: "DevOps Engineer",
        companies: ["CloudOps", "Infrastructure Co", "Deploy Systems", "CI/CD Experts", "AutoScale"],
        requirements: ["Docker", "Kubernetes", "AWS", "CI/CD", "Linux"],
        description: "Manage infrastructure and deployment pipelines. Ensure system reliability.",
        job_type: "Full-time",
        salary_bands: ["$100k-$150k", "$110k-$160k", "$120k-$170k"],
    },
    JobTemplate {
        title: "Mobile Developer",
        companies: ["AppMakers", "Mobile First", "Native Apps", "Cross Platform", "App Studio"],
        requirements: ["React Native", "TypeScript", "iOS", "Android", "Mobile UI"],
        description: "Build cross-platform mobile applications. Focus on performance and UX.",
        job_type: "Full-time",
        salary_bands: ["$90k-$140k", "$100k-$150k", "$110k-$160k"],
    },
    JobTemplate {
        title: "Data Engineer",
        companies: ["DataPipe", "Analytics Co", "Big Data Inc", "ETL Systems", "Data Warehouse"],
        requirements: ["Python", "SQL", "Spark", "Airflow", "AWS"],
        description: "Build data pipelines and ETL processes. Work with large-scale data systems.",
        job_type: "Full-time",
        salary_bands: ["$100k-$150k", "$110k-$160k", "$120k-$170k"],
    },
];

pub struct LocalJobGenerator;

impl LocalJobGenerator {
    /// Largest batch the templates can produce
    pub fn capacity() -> usize {
        TEMPLATES.len() * ROUNDS_PER_TEMPLATE
    }

    /// Postings relevant to `skills`, or every generated posting when none are.
    ///
    /// Selection is driven by the posting index only, so identical input gives
    /// identical titles, companies, salaries and locations.
    pub fn generate(
        skills: &[String],
        location: &str,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Vec<JobPosting> {
        let count = limit.min(Self::capacity());
        let batch = now.timestamp_millis();

        let jobs: Vec<JobPosting> = (0..count)
            .map(|i| Self::build(i, location, batch, now))
            .collect();

        let relevant: Vec<JobPosting> = jobs
            .iter()
            .filter(|job| shares_requirement(job, skills))
            .cloned()
            .collect();

        let mut selected = if relevant.is_empty() { jobs } else { relevant };
        selected.truncate(limit);
        selected
    }

    fn build(index: usize, location: &str, batch: i64, now: DateTime<Utc>) -> JobPosting {
        let template = &TEMPLATES[index % TEMPLATES.len()];
        let round = index / TEMPLATES.len();
        let company = template.companies[(round + index) % template.companies.len()];
        let salary = template.salary_bands[round % template.salary_bands.len()];

        let job_location = if index % 2 == 0 {
            location.to_string()
        } else {
            ALTERNATE_LOCATIONS[(index / 2) % ALTERNATE_LOCATIONS.len()].to_string()
        };
        let days_ago = 1 + (index as i64 * 7) % 30;

        let requirements: Vec<String> = template
            .requirements
            .iter()
            .map(|r| r.to_string())
            .collect();

        JobPosting {
            id: format!("job-{}-{}", batch, index),
            title: template.title.to_string(),
            company: company.to_string(),
            location: job_location,
            description: Some(template.description.to_string()),
            tags: requirements.iter().take(3).cloned().collect(),
            requirements,
            salary: Some(salary.to_string()),
            job_type: template.job_type.to_string(),
            posted: now - Duration::days(days_ago),
            url: format!("https://example.com/jobs/{}", index),
            source: GENERATOR_SOURCE.to_string(),
        }
    }
}

fn shares_requirement(job: &JobPosting, skills: &[String]) -> bool {
    job.requirements.iter().any(|req| {
        let req = req.to_lowercase();
        skills.iter().any(|skill| {
            let skill = skill.to_lowercase();
            !skill.is_empty() && (skill.contains(&req) || req.contains(&skill))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_never_exceeds_limit() {
        let now = Utc::now();
        let few = LocalJobGenerator::generate(&skills(&["Python"]), "Remote", 3, now);
        assert!(few.len() <= 3);
        assert!(few.iter().any(|j| j.title == "Backend Developer"));
        assert_eq!(LocalJobGenerator::generate(&skills(&["COBOL"]), "Remote", 3, now).len(), 3);
        assert!(LocalJobGenerator::generate(&skills(&["Python"]), "Remote", 100, now).len() <= 24);
        assert!(LocalJobGenerator::generate(&skills(&["Python"]), "Remote", 0, now).is_empty());
    }

    #[test]
    fn test_deterministic_for_fixed_input() {
        let input = skills(&["React", "AWS"]);
        let first = LocalJobGenerator::generate(&input, "Lahore", 20, Utc::now());
        let second = LocalJobGenerator::generate(&input, "Lahore", 20, Utc::now());

        let shape = |jobs: &[JobPosting]| {
            jobs.iter()
                .map(|j| (j.title.clone(), j.company.clone(), j.salary.clone(), j.location.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(shape(&first), shape(&second));
    }

    #[test]
    fn test_keeps_only_relevant_postings() {
        let jobs = LocalJobGenerator::generate(&skills(&["kubernetes"]), "Remote", 24, Utc::now());
        assert!(!jobs.is_empty());
        assert!(jobs.iter().all(|j| j.title == "DevOps Engineer"));
    }

    #[test]
    fn test_falls_back_to_all_postings() {
        let jobs = LocalJobGenerator::generate(&skills(&["COBOL"]), "Remote", 10, Utc::now());
        assert_eq!(jobs.len(), 10);
        assert_eq!(jobs[0].title, "Frontend Developer");
        assert_eq!(jobs[0].location, "Remote");
        assert_eq!(jobs[0].tags, vec!["React", "TypeScript", "CSS"]);
    }

    #[test]
    fn test_descriptions_pass_length_filter() {
        for job in LocalJobGenerator::generate(&[], "Remote", 24, Utc::now()) {
            assert!(job.trimmed_description().chars().count() >= 50, "{}", job.title);
        }
    }
}
