pub(super) fn init_metrics() {
    describe_uploads();
    describe_process();
}

fn describe_uploads() {
    metrics::describe_counter!(
        UPLOADS,
        "How many thumbnail and video uploads have finished, by kind and outcome"
    );
}

pub(crate) const UPLOADS: &str = "tubely.uploads";

fn describe_process() {
    metrics::describe_counter!(PROCESS_START, "How many ffprobe or ffmpeg processes have been spawned");
    metrics::describe_histogram!(
        PROCESS_DURATION,
        metrics::Unit::Seconds,
        "Timings for ffprobe and ffmpeg processes"
    );
    metrics::describe_counter!(
        PROCESS_END,
        "How many ffprobe or ffmpeg processes have exited or been killed"
    );
}

pub(crate) const PROCESS_START: &str = "tubely.process.start";
pub(crate) const PROCESS_DURATION: &str = "tubely.process.duration";
pub(crate) const PROCESS_END: &str = "tubely.process.end";
