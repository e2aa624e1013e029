//! Scores a query vector against every corpus row and selects the top
//! recipes.
//!
//! The score of a recipe is the cosine similarity between its feature row and
//! the query, multiplied by a proximity penalty for each numeric target and by
//! a 0/1 category mask. Penalties are `1 - |x - target| / corpus_max` and are
//! not clamped, so a recipe far enough from a target gets a negative factor.

use std::cmp::Ordering;

use crate::corpus::Corpus;

use super::encoder::QueryVector;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RankingOptions<'q> {
    pub target_calories: Option<f64>,
    pub target_time: Option<f64>,
    pub category: Option<&'q str>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRecipe {
    pub index: usize,
    pub score: f64,
}

/// Candidates considered per requested result before the category pass.
const OVERSAMPLING: usize = 3;

pub struct SimilarityRanker<'a> {
    corpus: &'a Corpus,
}

fn dot(query: &[(usize, f64)], row: impl Iterator<Item = (usize, f64)>) -> f64 {
    let mut sum = 0.0;
    let mut q = query.iter().peekable();
    for (column, value) in row {
        while let Some((qc, _)) = q.peek() {
            if *qc < column {
                q.next();
            } else {
                break;
            }
        }
        match q.peek() {
            Some((qc, qv)) if *qc == column => sum += qv * value,
            Some(_) => {}
            None => break,
        }
    }
    sum
}

fn penalty(value: f64, target: f64, max: f64) -> f64 {
    let divisor = if max == 0.0 { 1.0 } else { max };
    1.0 - (value - target).abs() / divisor
}

/// Descending score, then ascending corpus index.
fn by_rank(a: &ScoredRecipe, b: &ScoredRecipe) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.index.cmp(&b.index))
}

impl<'a> SimilarityRanker<'a> {
    pub fn new(corpus: &'a Corpus) -> Self {
        Self { corpus }
    }

    /// Cosine similarity of `query` with every row, zero for zero-norm rows.
    pub fn cosine_scores(&self, query: &QueryVector) -> Vec<f64> {
        let matrix = self.corpus.matrix();
        let query_norm = query.norm();
        (0..matrix.n_rows())
            .map(|i| {
                let row_norm = matrix.row(i).map(|(_, v)| v * v).sum::<f64>().sqrt();
                if query_norm == 0.0 || row_norm == 0.0 {
                    return 0.0;
                }
                dot(query.entries(), matrix.row(i)) / (query_norm * row_norm)
            })
            .collect()
    }

    /// Final score of every corpus row.
    pub fn score(&self, query: &QueryVector, options: &RankingOptions<'_>) -> Vec<f64> {
        let recipes = self.corpus.recipes();
        let mut scores = self.cosine_scores(query);

        if let Some(target) = options.target_calories {
            let max = self.corpus.max_calories();
            for (score, recipe) in scores.iter_mut().zip(recipes) {
                *score *= penalty(recipe.calories, target, max);
            }
        }
        if let Some(target) = options.target_time {
            let max = self.corpus.max_time();
            for (score, recipe) in scores.iter_mut().zip(recipes) {
                *score *= penalty(recipe.total_time_minutes as f64, target, max);
            }
        }
        if let Some(category) = options.category {
            for (score, recipe) in scores.iter_mut().zip(recipes) {
                if recipe.category != category {
                    *score = 0.0;
                }
            }
        }
        scores
    }

    /// Up to `top_n` best recipes, best first. The `OVERSAMPLING * top_n`
    /// highest scores are taken first, then recipes outside the category
    /// filter are skipped.
    pub fn rank(
        &self,
        query: &QueryVector,
        options: &RankingOptions<'_>,
        top_n: usize,
    ) -> Vec<ScoredRecipe> {
        let mut candidates: Vec<ScoredRecipe> = self
            .score(query, options)
            .into_iter()
            .enumerate()
            .map(|(index, score)| ScoredRecipe { index, score })
            .collect();

        let pool = top_n.saturating_mul(OVERSAMPLING).min(candidates.len());
        if pool == 0 {
            return Vec::new();
        }
        if pool < candidates.len() {
            candidates.select_nth_unstable_by(pool - 1, by_rank);
            candidates.truncate(pool);
        }
        candidates.sort_by(by_rank);

        let recipes = self.corpus.recipes();
        candidates
            .into_iter()
            .filter(|c| {
                options
                    .category
                    .map_or(true, |category| recipes[c.index].category == category)
            })
            .take(top_n)
            .collect()
    }
}
