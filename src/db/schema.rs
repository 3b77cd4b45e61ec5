use sqlx::PgPool;

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS "sessions" (
        "id" TEXT PRIMARY KEY,
        "userId" TEXT NOT NULL,
        "isActive" BOOLEAN NOT NULL DEFAULT TRUE,
        "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS "sessions_userId_idx" ON "sessions" ("userId")"#,
    r#"
    CREATE TABLE IF NOT EXISTS "messages" (
        "id" TEXT PRIMARY KEY,
        "sessionId" TEXT NOT NULL,
        "userId" TEXT NOT NULL,
        "role" TEXT NOT NULL,
        "content" TEXT NOT NULL,
        "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS "messages_sessionId_idx" ON "messages" ("sessionId", "createdAt")"#,
    r#"
    CREATE TABLE IF NOT EXISTS "topics" (
        "id" TEXT PRIMARY KEY,
        "name" TEXT NOT NULL,
        "levelMin" INTEGER NOT NULL,
        "levelMax" INTEGER NOT NULL,
        "prerequisiteTopicIds" TEXT[] NOT NULL DEFAULT '{}',
        "conceptTags" TEXT[] NOT NULL DEFAULT '{}',
        "difficultyWeight" DOUBLE PRECISION NOT NULL DEFAULT 1.0,
        "position" INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "user_progress" (
        "userId" TEXT PRIMARY KEY,
        "level" INTEGER NOT NULL DEFAULT 1,
        "totalAttempted" BIGINT NOT NULL DEFAULT 0,
        "totalCorrect" BIGINT NOT NULL DEFAULT 0,
        "currentStreak" BIGINT NOT NULL DEFAULT 0,
        "bestStreak" BIGINT NOT NULL DEFAULT 0,
        "lastPracticeAt" TIMESTAMPTZ
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "topic_mastery" (
        "userId" TEXT NOT NULL,
        "topicId" TEXT NOT NULL,
        "questionsAttempted" BIGINT NOT NULL DEFAULT 0,
        "questionsCorrect" BIGINT NOT NULL DEFAULT 0,
        "masteryPercentage" DOUBLE PRECISION NOT NULL DEFAULT 0,
        "needsReview" BOOLEAN NOT NULL DEFAULT FALSE,
        "lastAttemptedAt" TIMESTAMPTZ,
        PRIMARY KEY ("userId", "topicId")
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "questions" (
        "id" TEXT PRIMARY KEY,
        "topicId" TEXT NOT NULL,
        "dividend" BIGINT NOT NULL,
        "divisor" BIGINT NOT NULL,
        "correctAnswer" BIGINT NOT NULL,
        "remainder" BIGINT NOT NULL,
        "difficulty" INTEGER NOT NULL,
        "signature" TEXT NOT NULL,
        "timesServed" BIGINT NOT NULL DEFAULT 0,
        "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS "questions_pool_idx" ON "questions" ("difficulty", "topicId")"#,
    r#"CREATE INDEX IF NOT EXISTS "questions_signature_idx" ON "questions" ("signature")"#,
    r#"
    CREATE TABLE IF NOT EXISTS "question_attempts" (
        "userId" TEXT NOT NULL,
        "questionId" TEXT NOT NULL,
        "attemptsMade" BIGINT NOT NULL DEFAULT 0,
        "isCorrect" BOOLEAN NOT NULL DEFAULT FALSE,
        "userAnswer" TEXT,
        "videoRequested" BOOLEAN NOT NULL DEFAULT FALSE,
        "startedAt" TIMESTAMPTZ NOT NULL DEFAULT now(),
        "completedAt" TIMESTAMPTZ,
        PRIMARY KEY ("userId", "questionId")
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS "videos" (
        "id" TEXT PRIMARY KEY,
        "questionId" TEXT NOT NULL,
        "sessionId" TEXT NOT NULL,
        "status" TEXT NOT NULL,
        "videoUrl" TEXT,
        "error" TEXT,
        "createdAt" TIMESTAMPTZ NOT NULL DEFAULT now(),
        "updatedAt" TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"CREATE INDEX IF NOT EXISTS "videos_createdAt_idx" ON "videos" ("createdAt")"#,
];

pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
