/*
 * race runs two cancelable operations against one deadline and reports the
 * first terminal outcome. The loser is told to stop through the shared
 * cancellation token; it is never aborted, and whatever it returns after
 * that is ignored.
 */

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinError;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub enum Outcome<E> {
    Succeeded,
    Failed(E),
    TimedOut,
}

/*
 * TimedOut only ever comes from the timer owned here. An operation that
 * returns an error of its own, even a deadline error from some inner
 * timeout, is reported as Failed with that error untouched.
 */
pub async fn run<E, A, FA, B, FB>(timeout: Duration, first: A, second: B) -> Outcome<E>
where
    E: From<JoinError> + Send + 'static,
    A: FnOnce(CancellationToken) -> FA,
    FA: Future<Output = Result<(), E>> + Send + 'static,
    B: FnOnce(CancellationToken) -> FB,
    FB: Future<Output = Result<(), E>> + Send + 'static,
{
    let token = CancellationToken::new();
    let mut tasks = JoinSet::new();

    tasks.spawn(first(token.child_token()));
    tasks.spawn(second(token.child_token()));

    let outcome = tokio::select! {
	/* a completion ready at the same moment as the deadline wins */
	biased;

	Some(result) = tasks.join_next() => match result {
	    Ok(Ok(())) => Outcome::Succeeded,
	    Ok(Err(err)) => Outcome::Failed(err),
	    Err(err) => Outcome::Failed(E::from(err)),
	},
	_ = tokio::time::sleep(timeout) => Outcome::TimedOut,
    };

    token.cancel();
    tasks.detach_all();

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::Error;

    use std::time::Instant;
    use tokio::sync::oneshot;

    async fn until_cancelled(token: CancellationToken, done: oneshot::Sender<()>) -> Result<(), Error> {
	token.cancelled().await;
	let _ = done.send(());
	Err(Error::Cancelled)
    }

    #[tokio::test]
    async fn first_success_wins_and_cancels_the_other() {
	let (done, cancelled) = oneshot::channel();
	let start = Instant::now();

	let outcome = run(
	    Duration::from_secs(1),
	    |_| async {
		tokio::time::sleep(Duration::from_millis(10)).await;
		Ok::<(), Error>(())
	    },
	    move |token| until_cancelled(token, done),
	).await;

	assert!(matches!(outcome, Outcome::Succeeded));
	assert!(start.elapsed() < Duration::from_millis(900));
	tokio::time::timeout(Duration::from_millis(500), cancelled).await
	    .expect("blocked operation should observe cancellation")
	    .unwrap();
    }

    #[tokio::test]
    async fn deadline_is_reported_distinctly() {
	let (done_a, cancelled_a) = oneshot::channel();
	let (done_b, cancelled_b) = oneshot::channel();

	let outcome = run(
	    Duration::from_millis(5),
	    move |token| until_cancelled(token, done_a),
	    move |token| until_cancelled(token, done_b),
	).await;

	assert!(matches!(outcome, Outcome::TimedOut));
	cancelled_a.await.unwrap();
	cancelled_b.await.unwrap();
    }

    #[tokio::test]
    async fn first_failure_is_returned() {
	let outcome = run(
	    Duration::from_secs(1),
	    |_| async { Err::<(), Error>(Error::Other(String::from("boom"))) },
	    |token: CancellationToken| async move {
		token.cancelled().await;
		Ok(())
	    },
	).await;

	match outcome {
	    Outcome::Failed(Error::Other(msg)) => assert_eq!(msg, "boom"),
	    other => panic!("unexpected outcome {:?}", other),
	}
    }

    #[tokio::test]
    async fn operation_deadline_is_a_failure() {
	let outcome = run(
	    Duration::from_secs(1),
	    |_| async { Err::<(), Error>(Error::DeadlineExceeded) },
	    |token: CancellationToken| async move {
		token.cancelled().await;
		Ok(())
	    },
	).await;

	assert!(matches!(outcome, Outcome::Failed(Error::DeadlineExceeded)));
    }

    #[tokio::test]
    async fn panicking_operation_is_a_failure() {
	let outcome = run(
	    Duration::from_secs(1),
	    |_| async {
		if true {
		    panic!("operation panicked");
		}
		Ok::<(), Error>(())
	    },
	    |token: CancellationToken| async move {
		token.cancelled().await;
		Ok(())
	    },
	).await;

	assert!(matches!(outcome, Outcome::Failed(Error::Join(_))));
    }
}
