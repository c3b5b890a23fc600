//! `history list|delete|clear`

use crate::application::ports::{HistoryError, TranscriptionHistory};

use super::args::HistoryAction;
use super::presenter::Presenter;

pub async fn handle_history_command<H: TranscriptionHistory + ?Sized>(
    action: HistoryAction,
    history: &H,
    presenter: &Presenter,
) -> Result<(), HistoryError> {
    match action {
        HistoryAction::List { limit } => {
            let records = history.list(limit).await?;
            if records.is_empty() {
                presenter.info("No saved transcriptions");
            }
            for record in &records {
                presenter.history_record(record);
            }
        }
        HistoryAction::Delete { id } => {
            if history.delete(id).await? {
                presenter.success(&format!("Deleted transcription #{}", id));
            } else {
                presenter.warn(&format!("No transcription with id {}", id));
            }
        }
        HistoryAction::Clear => {
            let removed = history.clear().await?;
            presenter.success(&format!("Removed {} transcription(s)", removed));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::SqliteHistory;

    #[tokio::test]
    async fn delete_and_clear() {
        let history = SqliteHistory::in_memory().unwrap();
        let presenter = Presenter::new();
        let first = history.save("first").await.unwrap();
        history.save("second").await.unwrap();

        handle_history_command(HistoryAction::Delete { id: first.id }, &history, &presenter)
            .await
            .unwrap();
        assert_eq!(history.list(10).await.unwrap().len(), 1);

        handle_history_command(HistoryAction::List { limit: 10 }, &history, &presenter)
            .await
            .unwrap();
        handle_history_command(HistoryAction::Clear, &history, &presenter)
            .await
            .unwrap();
        assert!(history.list(10).await.unwrap().is_empty());
    }
}
