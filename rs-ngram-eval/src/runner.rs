use std::sync::{mpsc, Arc};
use std::thread;

use log::{info, warn};

use rs_ngram_core::model::{score, ModelConfig, PredictionInput};
use rs_ngram_core::text::token_count;
use rs_ngram_core::Result;

use crate::records::{extract_question, Record};
use crate::report::SlotTotals;

/// Chunks per CPU when spreading records over worker threads.
const CHUNKS_PER_CPU: usize = 8;

/// Evaluates one record with a fresh model.
///
/// # Behavior
/// - Optionally trains on the question extracted from the prompt.
/// - Scores every non-empty answer at every position, slot by slot.
/// - Without online training, trains on each answer once it is scored so
///   later answers of the same record benefit from it.
///
/// # Errors
/// Returns an error if the model configuration is invalid.
pub fn evaluate_record(record: &Record, config: &ModelConfig, input: &PredictionInput) -> Result<SlotTotals> {
    let mut model = config.build()?;
    let mut totals = SlotTotals::default();

    if input.train_on_prompt {
        model.train(extract_question(&record.question));
    }

    for (slot, answer) in record.answers.iter().enumerate() {
        totals.touch(slot);
        let tokens = token_count(&answer.text);
        if tokens == 0 {
            continue;
        }

        let predictions = model.predict_sequence(&answer.text, input.train_on_pred, input.lookahead(), input.beam_width());
        totals.add(slot, score(&predictions, &answer.text, input.lookahead()), tokens);

        if !input.train_on_pred {
            model.train(&answer.text);
        }
    }

    Ok(totals)
}

/// Evaluates every record in parallel and merges the per-slot totals.
///
/// # Behavior
/// - Splits records into chunks (based on CPU cores * factor).
/// - Spawns one thread per chunk; each record gets its own model.
/// - Merges chunk totals in chunk order so results are reproducible.
///
/// # Notes
/// - A record that fails is logged and skipped, the batch goes on.
/// - A chunk whose worker panics is logged and left out of the totals.
pub fn evaluate_records(records: Vec<Record>, config: &ModelConfig, input: &PredictionInput) -> SlotTotals {
    let config = config.clone();
    let input = input.clone();
    let (totals, _) = evaluate_in_chunks(records, move |record| evaluate_record(record, &config, &input));
    totals
}

/// Runs `evaluate` over chunks of `records` on worker threads.
///
/// Returns the merged totals and the number of records whose chunk
/// reported back.
fn evaluate_in_chunks<F>(records: Vec<Record>, evaluate: F) -> (SlotTotals, usize)
where
    F: Fn(&Record) -> Result<SlotTotals> + Send + Sync + 'static,
{
    if records.is_empty() {
        return (SlotTotals::default(), 0);
    }

    let chunks = num_cpus::get() * CHUNKS_PER_CPU;
    let chunk_size = records.len().div_ceil(chunks);
    let total = records.len();
    let evaluate = Arc::new(evaluate);

    let (tx, rx) = mpsc::channel();
    let mut workers = Vec::new();
    for (index, chunk) in records.chunks(chunk_size).enumerate() {
        let tx = tx.clone();
        let chunk: Vec<Record> = chunk.to_vec();
        let evaluate = Arc::clone(&evaluate);

        workers.push(thread::spawn(move || {
            let mut partial = SlotTotals::default();
            for (offset, record) in chunk.iter().enumerate() {
                match evaluate(record) {
                    Ok(totals) => partial.merge(&totals),
                    Err(e) => warn!("skipping record #{}: {e}", index * chunk_size + offset),
                }
            }
            if tx.send((index, partial, chunk.len())).is_err() {
                warn!("chunk #{index} finished after the collector stopped");
            }
        }));
    }
    drop(tx);

    let mut partials: Vec<(usize, SlotTotals)> = Vec::new();
    let mut done = 0;
    for (index, partial, size) in rx.iter() {
        done += size;
        info!("evaluated {done}/{total} records");
        partials.push((index, partial));
    }
    for (index, worker) in workers.into_iter().enumerate() {
        if worker.join().is_err() {
            warn!("chunk #{index} panicked, its records are missing from the totals");
        }
    }
    if done < total {
        warn!("only {done} of {total} records were evaluated");
    }
    partials.sort_by_key(|(index, _)| *index);

    let mut totals = SlotTotals::default();
    for (_, partial) in &partials {
        totals.merge(partial);
    }
    (totals, done)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::Answer;

    fn record(question: &str, answers: &[&str]) -> Record {
        Record {
            question: question.to_owned(),
            answers: answers.iter().map(|text| Answer { text: (*text).to_owned() }).collect(),
        }
    }

    #[test]
    fn later_answers_learn_from_earlier_ones() {
        let config = ModelConfig::new(2);
        let input = PredictionInput::default();
        let totals = evaluate_record(&record("q", &["x = 5", "x = 5"]), &config, &input).unwrap();

        assert_eq!(totals.slots(), 2);
        assert_eq!(totals.accuracy(0), 0.0);
        // After training on "x = 5", the bigram model predicts "= 5" after "x"
        // and "x" after the start sentinel.
        assert_eq!(totals.accuracy(1), 1.0);
    }

    #[test]
    fn prompt_training_helps_the_first_answer() {
        let config = ModelConfig::new(2);
        let mut input = PredictionInput::default();
        let unit = record("Question: x = 5 Answer:", &["x = 5"]);

        let cold = evaluate_record(&unit, &config, &input).unwrap();
        input.train_on_prompt = true;
        let warm = evaluate_record(&unit, &config, &input).unwrap();
        assert!(warm.accuracy(0) > cold.accuracy(0));
    }

    #[test]
    fn empty_answers_keep_their_slot() {
        let totals = evaluate_record(&record("q", &["", "a"]), &ModelConfig::new(1), &PredictionInput::default()).unwrap();
        assert_eq!(totals.slots(), 2);
        assert_eq!(totals.accuracy(0), 0.0);
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let config = ModelConfig::with_weights(2, vec![0.9, 0.9]);
        assert!(evaluate_record(&record("q", &["a"]), &config, &PredictionInput::default()).is_err());
    }

    #[test]
    fn parallel_and_sequential_totals_agree() {
        let config = ModelConfig::with_weights(3, vec![0.2, 0.3, 0.5]);
        let mut input = PredictionInput::new(2, 2).unwrap();
        input.train_on_pred = true;

        let records: Vec<Record> = (0..20)
            .map(|i| record(&format!("Question: {i} + {i} Answer:"), &[format!("{i} + {i} = {}", 2 * i).as_str(), "so the answer is 4"]))
            .collect();

        let mut sequential = SlotTotals::default();
        for r in &records {
            sequential.merge(&evaluate_record(r, &config, &input).unwrap());
        }
        let parallel = evaluate_records(records, &config, &input);
        assert_eq!(parallel.slots(), sequential.slots());
        for slot in 0..parallel.slots() {
            assert!((parallel.accuracy(slot) - sequential.accuracy(slot)).abs() < 1e-9);
        }
    }

    #[test]
    fn a_panicking_chunk_does_not_stop_the_batch() {
        let config = ModelConfig::new(2);
        let input = PredictionInput::default();
        // Enough records for one per chunk, so the panic only takes its own.
        let count = num_cpus::get() * CHUNKS_PER_CPU;
        let records: Vec<Record> = (0..count)
            .map(|i| record(if i == 1 { "crash" } else { "q" }, &["x = 5", "x = 5"]))
            .collect();

        let (totals, done) = evaluate_in_chunks(records, move |record| {
            if record.question == "crash" {
                panic!("worker failure");
            }
            evaluate_record(record, &config, &input)
        });
        assert_eq!(done, count - 1);
        assert_eq!(totals.slots(), 2);
        assert_eq!(totals.accuracy(1), 1.0);
    }
}
