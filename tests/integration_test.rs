#![cfg(unix)]

use matex::infrastructure::LatexCompiler;
use matex::models::{DocNode, QuestionBank, QuestionRecord};
use matex::services::ExamTemplate;
use matex::{order_selection, App, AssembleError, Config, ExamAssembler};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

/// 把 .tex 源文件原样复制为 PDF 的假编译器
const COPYING_COMPILER: &str = r#"#!/bin/sh
out=.
for arg in "$@"; do
  case "$arg" in
    -output-directory=*) out="${arg#-output-directory=}" ;;
  esac
done
cp exam.tex "$out/exam.pdf"
"#;

fn fake_compiler(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn record(id: i64, text: &str) -> QuestionRecord {
    QuestionRecord::new(
        id,
        DocNode::document(vec![DocNode::paragraph(vec![DocNode::text(text)])]),
        DocNode::document(vec![DocNode::paragraph(vec![DocNode::text("单元")])]),
    )
}

fn assembler(compiler: &Path, scratch_root: &Path) -> ExamAssembler {
    ExamAssembler::new(
        ExamTemplate::builtin().unwrap(),
        LatexCompiler::new(compiler.to_string_lossy()),
    )
    .with_scratch_root(Some(scratch_root.to_path_buf()))
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

#[tokio::test]
async fn test_successful_compile_returns_pdf_and_cleans_up() {
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let compiler = fake_compiler(tools.path(), "fake-latexmk", COPYING_COMPILER);

    let exam = assert_ok!(
        assembler(&compiler, scratch.path())
            .assemble("期中测试", &[record(1, "第一题")])
            .await
    );

    assert!(!exam.pdf.is_empty());
    assert_eq!(exam.question_count, 1);
    let source = String::from_utf8(exam.pdf).unwrap();
    assert!(source.contains("\\textbf{期中测试}"));
    assert!(source.contains("\\question 第一题"));
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_failed_compile_returns_stderr_verbatim() {
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let compiler = fake_compiler(
        tools.path(),
        "failing-latexmk",
        "#!/bin/sh\nprintf '! Undefined control sequence.\\nl.12 \\\\foo\\n' >&2\nexit 2\n",
    );

    let err = assert_err!(
        assembler(&compiler, scratch.path())
            .assemble("t", &[record(1, "一")])
            .await
    );

    match &err {
        AssembleError::Compilation { exit_code, stderr } => {
            assert_eq!(*exit_code, 2);
            assert_eq!(stderr, "! Undefined control sequence.\nl.12 \\foo\n");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.to_string(), "! Undefined control sequence.\nl.12 \\foo\n");
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_killed_compiler_is_disconnected() {
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let compiler = fake_compiler(tools.path(), "killed-latexmk", "#!/bin/sh\nkill -9 $$\n");

    let err = assert_err!(
        assembler(&compiler, scratch.path())
            .assemble("t", &[record(1, "一")])
            .await
    );

    assert!(matches!(err, AssembleError::Disconnected { .. }));
    assert_eq!(err.to_string(), "something went wrong: disconnected");
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_missing_compiler_is_distinct_error() {
    let scratch = TempDir::new().unwrap();
    let err = assert_err!(
        assembler(Path::new("/definitely/not/latexmk"), scratch.path())
            .assemble("t", &[record(1, "一")])
            .await
    );

    assert!(matches!(err, AssembleError::CompilerUnavailable { .. }));
    assert_eq!(
        err.to_string(),
        "something went wrong: latex failed make sure it is installed and on path"
    );
    assert!(is_empty_dir(scratch.path()));
}

const HANGING_COMPILER: &str = "#!/bin/sh\nexec sleep 30\n";

#[tokio::test]
async fn test_compile_timeout_cleans_up() {
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let compiler = fake_compiler(tools.path(), "hanging-latexmk", HANGING_COMPILER);
    let assembler = ExamAssembler::new(
        ExamTemplate::builtin().unwrap(),
        LatexCompiler::new(compiler.to_string_lossy()).with_timeout(Some(Duration::from_millis(300))),
    )
    .with_scratch_root(Some(scratch.path().to_path_buf()));

    let err = assert_err!(assembler.assemble("t", &[record(1, "一")]).await);

    assert!(matches!(err, AssembleError::Timeout(_)));
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_dropped_assembly_cleans_up() {
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let compiler = fake_compiler(tools.path(), "hanging-latexmk", HANGING_COMPILER);
    let assembler = assembler(&compiler, scratch.path());

    let questions = [record(1, "一")];
    let started = std::time::Instant::now();
    let result = tokio::time::timeout(
        Duration::from_millis(300),
        assembler.assemble("t", &questions),
    )
    .await;

    // 外层取消后 future 被丢弃：编译进程被终止，临时目录被清理
    assert!(result.is_err());
    assert!(started.elapsed() < Duration::from_secs(10));
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_concurrent_assemblies_do_not_share_files() {
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let compiler = fake_compiler(
        tools.path(),
        "slow-latexmk",
        &COPYING_COMPILER.replacen("cp exam.tex", "sleep 1\ncp exam.tex", 1),
    );
    let assembler = assembler(&compiler, scratch.path());

    let first = [record(1, "甲卷题目")];
    let second = [record(2, "乙卷题目")];
    let (a, b) = tokio::join!(
        assembler.assemble("甲卷", &first),
        assembler.assemble("乙卷", &second)
    );

    let a = String::from_utf8(assert_ok!(a).pdf).unwrap();
    let b = String::from_utf8(assert_ok!(b).pdf).unwrap();
    assert!(a.contains("甲卷题目") && !a.contains("乙卷题目"));
    assert!(b.contains("乙卷题目") && !b.contains("甲卷题目"));
    assert!(is_empty_dir(scratch.path()));
}

#[tokio::test]
async fn test_selection_order_is_kept_in_output() {
    let tools = TempDir::new().unwrap();
    let scratch = TempDir::new().unwrap();
    let compiler = fake_compiler(tools.path(), "fake-latexmk", COPYING_COMPILER);

    let bank: QuestionBank = vec![record(2, "题目二"), record(5, "题目五"), record(8, "题目八")]
        .into_iter()
        .collect();
    let records = bank.select(&order_selection([5, 2, 8]));

    let exam = assert_ok!(
        assembler(&compiler, scratch.path())
            .assemble("顺序", &records)
            .await
    );
    let source = String::from_utf8(exam.pdf).unwrap();

    let five = source.find("题目五").unwrap();
    let two = source.find("题目二").unwrap();
    let eight = source.find("题目八").unwrap();
    assert!(five < two && two < eight);
}

const LESSON_TOML: &str = r#"
course = "高一数学"
unit = '{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"函数"}]}]}'
lesson = '{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"二次函数"}]}]}'

[[questions]]
id = 2
text = '{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"求"},{"type":"inlineFormula","attrs":{"code":"x^2=4"}},{"type":"text","text":"的解"}]}]}'

[[questions]]
id = 5
text = '{"type":"doc","content":[{"type":"paragraph","content":[{"type":"text","text":"第五题"}]}]}'
"#;

const EXAM_TOML: &str = r#"
title = "函数小测"
questions = [5, 2, 99]
output = "quiz.pdf"
"#;

#[tokio::test]
async fn test_app_runs_exam_jobs_end_to_end() {
    let work = TempDir::new().unwrap();
    let root = work.path();
    for dir in ["bank", "exams", "scratch"] {
        std::fs::create_dir(root.join(dir)).unwrap();
    }
    std::fs::write(root.join("bank/functions.toml"), LESSON_TOML).unwrap();
    std::fs::write(root.join("exams/quiz.toml"), EXAM_TOML).unwrap();
    let compiler = fake_compiler(root, "fake-latexmk", COPYING_COMPILER);

    let path = |name: &str| root.join(name).to_string_lossy().to_string();
    let config = Config {
        max_concurrent_exams: 2,
        question_bank_folder: path("bank"),
        exam_folder: path("exams"),
        output_folder: path("out"),
        compiler_program: compiler.to_string_lossy().to_string(),
        scratch_root: Some(path("scratch")),
        exam_title: "随堂练习".to_string(),
        exam_selection: Some(order_selection([2])),
        output_log_file: path("output.txt"),
        failure_log_file: path("failed.txt"),
        ..Config::default()
    };

    let app = assert_ok!(App::initialize(config).await);
    let stats = assert_ok!(app.run().await);

    assert_eq!(stats.total, 2);
    assert_eq!(stats.success, 2);
    assert_eq!(stats.failed, 0);

    let quiz = std::fs::read_to_string(root.join("out/quiz.pdf")).unwrap();
    assert!(quiz.contains("\\textbf{函数小测}"));
    assert!(quiz.find("第五题").unwrap() < quiz.find("$x^2=4$").unwrap());
    assert!(quiz.contains("% question 2: 二次函数"));

    let practice = std::fs::read_to_string(root.join("out/随堂练习.pdf")).unwrap();
    assert!(practice.contains("\\question 求 $x^2=4$ 的解"));

    assert!(!root.join("failed.txt").exists());
    assert!(is_empty_dir(&root.join("scratch")));
    assert!(std::fs::read_to_string(root.join("output.txt")).unwrap().contains("组卷日志"));
}

#[tokio::test]
async fn test_app_records_failed_exam() {
    let work = TempDir::new().unwrap();
    let root = work.path();
    std::fs::create_dir(root.join("bank")).unwrap();
    std::fs::write(root.join("bank/functions.toml"), LESSON_TOML).unwrap();
    let compiler = fake_compiler(
        root,
        "failing-latexmk",
        "#!/bin/sh\necho '! LaTeX Error: File `missing.sty'\"'\"' not found.' >&2\nexit 12\n",
    );

    let path = |name: &str| root.join(name).to_string_lossy().to_string();
    let config = Config {
        question_bank_folder: path("bank"),
        exam_folder: path("no-exams"),
        output_folder: path("out"),
        compiler_program: compiler.to_string_lossy().to_string(),
        exam_title: "坏卷".to_string(),
        exam_selection: Some(order_selection([5])),
        output_log_file: path("output.txt"),
        failure_log_file: path("failed.txt"),
        ..Config::default()
    };

    let stats = App::initialize(config).await.unwrap().run().await.unwrap();
    assert_eq!((stats.success, stats.failed), (0, 1));
    assert!(!root.join("out/坏卷.pdf").exists());

    let failures = std::fs::read_to_string(root.join("failed.txt")).unwrap();
    assert_eq!(
        failures,
        "坏卷 | ! LaTeX Error: File `missing.sty' not found.\n    ! LaTeX Error: File `missing.sty' not found.\n"
    );
}

#[tokio::test]
#[ignore] // 需要本机安装 latexmk：cargo test -- --ignored
async fn test_real_latexmk_produces_pdf() {
    let scratch = TempDir::new().unwrap();
    let assembler = ExamAssembler::new(ExamTemplate::builtin().unwrap(), LatexCompiler::default())
        .with_scratch_root(Some(scratch.path().to_path_buf()));

    let question = QuestionRecord::new(
        1,
        DocNode::document(vec![
            DocNode::paragraph(vec![
                DocNode::text("Solve "),
                DocNode::inline_formula("x^2 = 4"),
            ]),
            DocNode::ordered_list(vec![
                DocNode::list_item(vec![DocNode::paragraph(vec![DocNode::text("positive root")])]),
                DocNode::list_item(vec![DocNode::paragraph(vec![DocNode::text("negative root")])]),
            ]),
        ]),
        DocNode::document(vec![]),
    );

    let exam = assembler.assemble("Quiz", &[question]).await.expect("latexmk 编译失败");
    assert!(exam.pdf.starts_with(b"%PDF"));
    assert!(is_empty_dir(scratch.path()));
}
