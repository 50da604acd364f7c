#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value as JsonValue;
use tower::ServiceExt;

use quiz_log::database::repository::{AttemptRepository, QuizRepository, StatisticsRepository};
use quiz_log::error::{Error, Result};
use quiz_log::loader::LoaderConfig;
use quiz_log::models::answer::{Answer, NewAnswer};
use quiz_log::models::attempt::{Attempt, NewAttempt};
use quiz_log::models::question::{NewQuestion, Question, QuestionUpdate};
use quiz_log::models::quiz::{NewQuiz, Quiz, QuizUpdate};
use quiz_log::models::statistics::CategoryStat;
use quiz_log::models::tag::Tag;
use quiz_log::{routes, AppState};

#[derive(Default)]
struct Store {
    next_id: i32,
    quizzes: Vec<Quiz>,
    questions: Vec<Question>,
    tags: Vec<Tag>,
    quiz_tags: Vec<(i32, i32)>,
    question_tags: Vec<(i32, i32)>,
    attempts: Vec<Attempt>,
    answers: Vec<Answer>,
    question_batches: Vec<Vec<i32>>,
    tag_batches: Vec<Vec<i32>>,
}

impl Store {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }
}

// Creation times advance one second per row so ordering is deterministic.
fn stamp(id: i32) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + i64::from(id), 0)
        .single()
        .unwrap()
}

/// Repository backed by plain vectors, implementing every storage trait.
#[derive(Default)]
pub struct InMemoryRepository {
    store: Mutex<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn store(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    pub fn add_quiz(&self, title: &str) -> i32 {
        let mut s = self.store();
        let id = s.next_id();
        s.quizzes.push(Quiz {
            id,
            title: title.into(),
            description: None,
            created_at: stamp(id),
            updated_at: stamp(id),
        });
        id
    }

    pub fn add_question(&self, quiz_id: i32, content: &str, correct_answer: &str) -> i32 {
        let mut s = self.store();
        let id = s.next_id();
        s.questions.push(Question {
            id,
            quiz_id: Some(quiz_id),
            question_type: "SHORT_ANSWER".into(),
            content: content.into(),
            options: Vec::new(),
            correct_answer: correct_answer.into(),
            explanation: None,
            difficulty: "EASY".into(),
            created_at: stamp(id),
            updated_at: stamp(id),
        });
        id
    }

    pub fn add_tag(&self, name: &str) -> i32 {
        let mut s = self.store();
        let id = s.next_id();
        s.tags.push(Tag {
            id,
            name: name.into(),
        });
        id
    }

    pub fn tag_quiz(&self, quiz_id: i32, tag_id: i32) {
        self.store().quiz_tags.push((quiz_id, tag_id));
    }

    pub fn tag_question(&self, question_id: i32, tag_id: i32) {
        self.store().question_tags.push((question_id, tag_id));
    }

    pub fn stored_attempts(&self) -> Vec<Attempt> {
        self.store().attempts.clone()
    }

    pub fn stored_answers(&self, attempt_id: i32) -> Vec<Answer> {
        self.store()
            .answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect()
    }

    pub fn question_batches(&self) -> Vec<Vec<i32>> {
        self.store().question_batches.clone()
    }

    pub fn tag_batches(&self) -> Vec<Vec<i32>> {
        self.store().tag_batches.clone()
    }
}

#[async_trait]
impl AttemptRepository for InMemoryRepository {
    async fn count_questions(&self, quiz_id: i32) -> Result<i32> {
        let s = self.store();
        Ok(s.questions
            .iter()
            .filter(|q| q.quiz_id == Some(quiz_id))
            .count() as i32)
    }

    async fn correct_answer(&self, question_id: i32) -> Result<String> {
        self.store()
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .map(|q| q.correct_answer.clone())
            .ok_or_else(|| Error::NotFound(format!("Question {} not found", question_id)))
    }

    async fn insert_attempt(&self, attempt: NewAttempt) -> Result<i32> {
        let mut s = self.store();
        let id = s.next_id();
        s.attempts.push(Attempt {
            id,
            quiz_id: Some(attempt.quiz_id),
            started_at: attempt.started_at,
            completed_at: Some(attempt.completed_at),
            score: attempt.score,
            total_questions: attempt.total_questions,
        });
        Ok(id)
    }

    async fn insert_answer(&self, answer: NewAnswer) -> Result<()> {
        let mut s = self.store();
        let id = s.next_id();
        s.answers.push(Answer {
            id,
            attempt_id: answer.attempt_id,
            question_id: answer.question_id,
            user_answer: answer.user_answer,
            is_correct: answer.is_correct,
        });
        Ok(())
    }

    async fn update_attempt_score(&self, attempt_id: i32, score: i32) -> Result<()> {
        let mut s = self.store();
        if let Some(attempt) = s.attempts.iter_mut().find(|a| a.id == attempt_id) {
            attempt.score = score;
        }
        Ok(())
    }

    async fn find_attempt(&self, attempt_id: i32) -> Result<Attempt> {
        self.store()
            .attempts
            .iter()
            .find(|a| a.id == attempt_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Attempt {} not found", attempt_id)))
    }

    async fn list_attempts(&self, quiz_id: Option<i32>) -> Result<Vec<Attempt>> {
        let mut rows: Vec<Attempt> = self
            .store()
            .attempts
            .iter()
            .filter(|a| quiz_id.is_none() || a.quiz_id == quiz_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.started_at, b.id).cmp(&(a.started_at, a.id)));
        Ok(rows)
    }

    async fn list_answers(&self, attempt_id: i32) -> Result<Vec<Answer>> {
        let mut rows = self.stored_answers(attempt_id);
        rows.sort_by_key(|a| a.id);
        Ok(rows)
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn list_quizzes(&self) -> Result<Vec<Quiz>> {
        let mut rows = self.store().quizzes.clone();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn find_quiz(&self, quiz_id: i32) -> Result<Option<Quiz>> {
        Ok(self
            .store()
            .quizzes
            .iter()
            .find(|q| q.id == quiz_id)
            .cloned())
    }

    async fn insert_quiz(&self, quiz: NewQuiz) -> Result<Quiz> {
        let id = self.add_quiz(&quiz.title);
        let mut s = self.store();
        for tag_id in quiz.tag_ids {
            if !s.quiz_tags.contains(&(id, tag_id)) {
                s.quiz_tags.push((id, tag_id));
            }
        }
        let created = s
            .quizzes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or_else(|| Error::Internal("quiz vanished".into()))?;
        created.description = quiz.description;
        Ok(created.clone())
    }

    async fn update_quiz(&self, quiz_id: i32, update: QuizUpdate) -> Result<Option<Quiz>> {
        let mut s = self.store();
        let Some(quiz) = s.quizzes.iter_mut().find(|q| q.id == quiz_id) else {
            return Ok(None);
        };
        if let Some(title) = update.title {
            quiz.title = title;
        }
        if let Some(description) = update.description {
            quiz.description = Some(description);
        }
        quiz.updated_at = Utc::now();
        let updated = quiz.clone();

        if let Some(tag_ids) = update.tag_ids {
            s.quiz_tags.retain(|(q, _)| *q != quiz_id);
            for tag_id in tag_ids {
                if !s.quiz_tags.contains(&(quiz_id, tag_id)) {
                    s.quiz_tags.push((quiz_id, tag_id));
                }
            }
        }
        Ok(Some(updated))
    }

    async fn delete_quiz(&self, quiz_id: i32) -> Result<bool> {
        let mut s = self.store();
        let before = s.quizzes.len();
        s.quizzes.retain(|q| q.id != quiz_id);
        if s.quizzes.len() == before {
            return Ok(false);
        }
        s.quiz_tags.retain(|(q, _)| *q != quiz_id);
        for question in s.questions.iter_mut().filter(|q| q.quiz_id == Some(quiz_id)) {
            question.quiz_id = None;
        }
        for attempt in s.attempts.iter_mut().filter(|a| a.quiz_id == Some(quiz_id)) {
            attempt.quiz_id = None;
        }
        Ok(true)
    }

    async fn questions_by_quiz_ids(
        &self,
        quiz_ids: Vec<i32>,
    ) -> Result<HashMap<i32, Vec<Question>>> {
        let mut s = self.store();
        s.question_batches.push(quiz_ids.clone());
        let wanted: HashSet<i32> = quiz_ids.into_iter().collect();

        let mut rows: Vec<Question> = s
            .questions
            .iter()
            .filter(|q| q.quiz_id.map_or(false, |id| wanted.contains(&id)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.quiz_id, a.created_at, a.id).cmp(&(b.quiz_id, b.created_at, b.id)));

        let mut grouped: HashMap<i32, Vec<Question>> = HashMap::new();
        for question in rows {
            if let Some(quiz_id) = question.quiz_id {
                grouped.entry(quiz_id).or_default().push(question);
            }
        }
        Ok(grouped)
    }

    async fn tags_by_quiz_ids(&self, quiz_ids: Vec<i32>) -> Result<HashMap<i32, Vec<Tag>>> {
        let mut s = self.store();
        s.tag_batches.push(quiz_ids.clone());
        let wanted: HashSet<i32> = quiz_ids.into_iter().collect();

        let mut grouped: HashMap<i32, Vec<Tag>> = HashMap::new();
        for (quiz_id, tag_id) in s.quiz_tags.iter().filter(|(q, _)| wanted.contains(q)) {
            if let Some(tag) = s.tags.iter().find(|t| t.id == *tag_id) {
                grouped.entry(*quiz_id).or_default().push(tag.clone());
            }
        }
        for tags in grouped.values_mut() {
            tags.sort_by(|a, b| a.name.cmp(&b.name));
        }
        Ok(grouped)
    }

    async fn question_by_id(&self, question_id: i32) -> Result<Option<Question>> {
        Ok(self
            .store()
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .cloned())
    }

    async fn insert_question(&self, question: NewQuestion) -> Result<Question> {
        let mut s = self.store();
        let id = s.next_id();
        let created = Question {
            id,
            quiz_id: question.quiz_id,
            question_type: question.question_type.as_str().into(),
            content: question.content,
            options: question.options,
            correct_answer: question.correct_answer,
            explanation: question.explanation,
            difficulty: question.difficulty.as_str().into(),
            created_at: stamp(id),
            updated_at: stamp(id),
        };
        s.questions.push(created.clone());
        for tag_id in question.tag_ids {
            if !s.question_tags.contains(&(id, tag_id)) {
                s.question_tags.push((id, tag_id));
            }
        }
        Ok(created)
    }

    async fn list_questions(&self, quiz_id: Option<i32>) -> Result<Vec<Question>> {
        let mut rows: Vec<Question> = self
            .store()
            .questions
            .iter()
            .filter(|q| quiz_id.is_none() || q.quiz_id == quiz_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.created_at, a.id).cmp(&(b.created_at, b.id)));
        Ok(rows)
    }

    async fn update_question(
        &self,
        question_id: i32,
        update: QuestionUpdate,
    ) -> Result<Option<Question>> {
        let mut s = self.store();
        let Some(question) = s.questions.iter_mut().find(|q| q.id == question_id) else {
            return Ok(None);
        };
        if let Some(question_type) = update.question_type {
            question.question_type = question_type.as_str().into();
        }
        if let Some(content) = update.content {
            question.content = content;
        }
        if let Some(options) = update.options {
            question.options = options;
        }
        if let Some(correct_answer) = update.correct_answer {
            question.correct_answer = correct_answer;
        }
        if let Some(explanation) = update.explanation {
            question.explanation = Some(explanation);
        }
        if let Some(difficulty) = update.difficulty {
            question.difficulty = difficulty.as_str().into();
        }
        question.updated_at = Utc::now();
        let updated = question.clone();

        if let Some(tag_ids) = update.tag_ids {
            s.question_tags.retain(|(q, _)| *q != question_id);
            for tag_id in tag_ids {
                if !s.question_tags.contains(&(question_id, tag_id)) {
                    s.question_tags.push((question_id, tag_id));
                }
            }
        }
        Ok(Some(updated))
    }

    async fn delete_question(&self, question_id: i32) -> Result<bool> {
        let mut s = self.store();
        let before = s.questions.len();
        s.questions.retain(|q| q.id != question_id);
        if s.questions.len() == before {
            return Ok(false);
        }
        s.question_tags.retain(|(q, _)| *q != question_id);
        s.answers.retain(|a| a.question_id != question_id);
        Ok(true)
    }

    async fn tags_by_question_id(&self, question_id: i32) -> Result<Vec<Tag>> {
        let s = self.store();
        let mut rows: Vec<Tag> = s
            .question_tags
            .iter()
            .filter(|(q, _)| *q == question_id)
            .filter_map(|(_, tag_id)| s.tags.iter().find(|t| t.id == *tag_id).cloned())
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn wrong_questions(&self) -> Result<Vec<Question>> {
        let s = self.store();
        let missed: HashSet<i32> = s
            .answers
            .iter()
            .filter(|a| !a.is_correct)
            .map(|a| a.question_id)
            .collect();
        let mut rows: Vec<Question> = s
            .questions
            .iter()
            .filter(|q| missed.contains(&q.id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(rows)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let mut rows = self.store().tags.clone();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    async fn insert_tag(&self, name: String) -> Result<Tag> {
        if self.store().tags.iter().any(|t| t.name == name) {
            return Err(Error::BadRequest(format!("Tag '{}' already exists", name)));
        }
        let id = self.add_tag(&name);
        Ok(Tag { id, name })
    }
}

#[async_trait]
impl StatisticsRepository for InMemoryRepository {
    async fn count_attempts(&self) -> Result<i64> {
        Ok(self.store().attempts.len() as i64)
    }

    async fn average_score(&self) -> Result<f64> {
        let s = self.store();
        let scored: Vec<i32> = s
            .attempts
            .iter()
            .filter(|a| a.total_questions > 0)
            .map(|a| a.score)
            .collect();
        if scored.is_empty() {
            return Ok(0.0);
        }
        Ok(scored.iter().map(|&v| f64::from(v)).sum::<f64>() / scored.len() as f64)
    }

    async fn category_stats(&self) -> Result<Vec<CategoryStat>> {
        let s = self.store();
        let mut per_tag: HashMap<String, (i64, i64)> = HashMap::new();
        for (question_id, tag_id) in &s.question_tags {
            let Some(tag) = s.tags.iter().find(|t| t.id == *tag_id) else {
                continue;
            };
            for answer in s.answers.iter().filter(|a| a.question_id == *question_id) {
                let entry = per_tag.entry(tag.name.clone()).or_default();
                entry.0 += i64::from(answer.is_correct);
                entry.1 += 1;
            }
        }

        let mut rows: Vec<CategoryStat> = per_tag
            .into_iter()
            .map(|(tag_name, (correct, total))| CategoryStat {
                tag_name,
                correct_rate: correct as f64 * 100.0 / total as f64,
                total_answers: total,
            })
            .collect();
        rows.sort_by(|a, b| a.tag_name.cmp(&b.tag_name));
        Ok(rows)
    }
}

pub fn app(repo: Arc<InMemoryRepository>) -> Router {
    let state = AppState::from_repositories(
        repo.clone(),
        repo.clone(),
        repo,
        LoaderConfig {
            wait: Duration::from_millis(5),
            max_batch: None,
        },
    );
    routes::create_router(state)
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), 1024 * 1024).await.unwrap();
    let body = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}
